mod config;
mod handlers;
mod i18n;
mod logging;
mod platform;
mod sanitize;
mod throttle;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::config::Config;
use crate::handlers::AppState;
use crate::i18n::Catalog;
use crate::platform::telegram::{self, TelegramMessenger};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads the environment
    dotenv::dotenv().ok();

    let _log_guard = logging::init(Path::new(logging::LOG_DIR))?;

    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    info!("Configuration loaded successfully");
    info!(
        "  Web app: {}",
        config
            .webapp_url
            .as_ref()
            .map(|u| u.as_str())
            .unwrap_or("disabled")
    );
    info!("  Error log chat: {:?}", config.error_log_chat);

    let catalog = Catalog::builtin()?;

    let bot = teloxide::Bot::new(&config.bot_token);
    let messenger = Arc::new(TelegramMessenger::new(bot.clone()));
    let state = Arc::new(AppState::new(config, catalog, messenger));

    info!("Starting the bot...");
    telegram::run(state, bot).await
}
