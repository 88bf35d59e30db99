//! Telegram bot integration and handlers

pub mod bot;
pub mod callback;
pub mod handlers;
pub mod markdown;
pub mod schema;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use callback::RenameAction;
pub use schema::{schema, HandlerDeps, HandlerError};
