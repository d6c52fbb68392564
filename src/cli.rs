use clap::{Parser, Subcommand};

/// Canvass - conversational survey bot for Telegram.
#[derive(Parser, Debug)]
#[command(name = "canvass")]
#[command(version = "0.1.0")]
#[command(about = "Run surveys over Telegram chat.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the bot and long-poll for updates
    Run,
    /// Verify the bot credential against the Telegram API
    Health,
}
