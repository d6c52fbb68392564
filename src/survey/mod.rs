pub mod catalog;
pub mod machine;
pub mod render;
pub mod reporter;
pub mod session;

pub use catalog::{Catalog, ChoiceMode, Question, QuestionKind};
pub use machine::{Effect, Event, Tap};
pub use session::{Session, SessionRegistry, Stage, VoiceForward};
