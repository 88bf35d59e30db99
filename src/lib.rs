//! Renamebot - Telegram bot that renames uploaded documents
//!
//! A document upload starts a per-user session; the next text message is
//! the new base name; inline Confirm/Cancel buttons finish the flow by
//! sending the file back under its new name. An axum liveness endpoint
//! runs alongside for uptime probing.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, liveness server
//! - `rename`: session state machine and scratch-space management
//! - `telegram`: bot setup, dispatcher schema, and event handlers

pub mod core;
pub mod rename;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult};
pub use crate::rename::{ScratchStore, SessionStore};
pub use crate::telegram::{create_bot, schema, HandlerDeps};
