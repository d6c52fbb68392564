#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::new_without_default
)]

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod survey;
pub mod transport;

pub use config::Config;
