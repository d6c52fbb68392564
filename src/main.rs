#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use canvass::app::SurveyBot;
use canvass::cli::{Cli, Commands};
use canvass::config::Config;
use canvass::survey::Catalog;
use canvass::transport::TelegramTransport;
use clap::Parser;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();
    let mut config = Config::load_or_init()?;
    config.apply_env_overrides();

    match cli.command {
        Commands::Run => run_bot(config).await,
        Commands::Health => health(&config).await,
    }
}

async fn run_bot(config: Config) -> Result<()> {
    config.validate_for_run()?;
    let catalog = Catalog::from_config(config.survey.as_ref())?;

    let transport = Arc::new(TelegramTransport::new(
        config.bot_token.clone(),
        config.allowed_users.clone(),
    ));
    let bot = SurveyBot::new(transport.clone(), catalog, config.admin_chat_id);

    let (tx, rx) = mpsc::channel(64);
    let listener = tokio::spawn(async move { transport.listen(tx).await });

    tracing::info!("canvass survey bot started");

    tokio::select! {
        () = bot.run(rx) => {}
        result = listener => result??,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl-c, shutting down");
        }
    }

    Ok(())
}

async fn health(config: &Config) -> Result<()> {
    if config.bot_token.is_empty() {
        anyhow::bail!("bot_token is empty; nothing to check");
    }
    let transport = TelegramTransport::new(config.bot_token.clone(), config.allowed_users.clone());
    if transport.health_check().await {
        println!("ok: telegram accepted the bot credential");
        Ok(())
    } else {
        anyhow::bail!("telegram rejected the bot credential")
    }
}
