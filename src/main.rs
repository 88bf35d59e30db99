use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;

use renamebot::core::{config, init_logger, start_liveness_server};
use renamebot::rename::{ScratchStore, SessionStore};
use renamebot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the Telegram rename bot
///
/// # Errors
/// Returns an error if initialization fails (logging, scratch folder,
/// bot creation) or if the bot token is missing.
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present, before any config
    // Lazy statics are first read
    let _ = dotenv();

    // Set up global panic handler so a panic inside the dispatcher is
    // logged instead of silently terminating a handler task
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    // Fail loudly rather than starting with an invalid token
    if config::BOT_TOKEN.is_empty() {
        return Err(anyhow::anyhow!("BOT_TOKEN environment variable not set"));
    }

    run_bot().await
}

async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");

    let bot = create_bot()?;

    let bot_info = bot
        .get_me()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to Bot API: {}", e))?;
    log::info!("Bot username: {:?}, Bot ID: {}", bot_info.username, bot_info.id);

    setup_bot_commands(&bot).await?;

    // Scratch root for in-flight renames, created idempotently
    let scratch = Arc::new(ScratchStore::init(config::DOWNLOAD_FOLDER.as_str()).await?);
    log::info!("Scratch folder: {}", scratch.root().display());

    // Per-user session table plus periodic sweep of abandoned sessions
    let sessions = Arc::new(SessionStore::new());
    Arc::clone(&sessions).spawn_sweep_task(config::session::sweep_interval());

    // Liveness endpoint for the hosting platform's uptime probe
    let web_port = *config::WEB_PORT;
    tokio::spawn(async move {
        if let Err(e) = start_liveness_server(web_port).await {
            log::error!("Liveness server error: {}", e);
        }
    });

    let handler = schema(HandlerDeps::new(sessions, scratch));

    log::info!("================================================");
    log::info!("📡 Ready to receive updates!");
    log::info!("================================================");

    Dispatcher::builder(bot, handler)
        .dependencies(DependencyMap::new())
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
