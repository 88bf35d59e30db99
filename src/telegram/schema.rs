//! Dispatcher schema and handler chain builders

use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use crate::rename::{ScratchStore, SessionStore};
use crate::telegram::bot::{Command, START_TEXT};
use crate::telegram::callback::RenameAction;
use crate::telegram::handlers::{handle_document, handle_media_guidance, handle_new_name, handle_rename_action};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub sessions: Arc<SessionStore>,
    pub scratch: Arc<ScratchStore>,
}

impl HandlerDeps {
    pub fn new(sessions: Arc<SessionStore>, scratch: Arc<ScratchStore>) -> Self {
        Self { sessions, scratch }
    }
}

/// Creates the main dispatcher schema for the bot.
///
/// Returns a handler tree for teloxide's Dispatcher; the same schema is
/// used in production and can be driven by tests. Endpoints log failures
/// and return `Ok(())` so one user's error never stops the update loop.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_document = deps.clone();
    let deps_text = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        // Command handler
        .branch(command_handler())
        // Document uploads start (or restart) a rename session
        .branch(document_handler(deps_document))
        // Inline media gets the "send as document" guidance
        .branch(media_guidance_handler())
        // Plain text is the new base name
        .branch(text_handler(deps_text))
        // Confirm/Cancel buttons
        .branch(callback_handler(deps_callback))
}

/// Handler for bot commands (/start)
fn command_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| async move {
            log::info!("🎯 Received command: {:?} from chat {}", cmd, msg.chat.id);

            match cmd {
                Command::Start => {
                    if let Err(e) = bot.send_message(msg.chat.id, START_TEXT).await {
                        log::error!("Failed to answer /start in chat {}: {}", msg.chat.id, e);
                    }
                }
            }
            Ok(())
        },
    ))
}

/// Handler for document uploads
fn document_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.document().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_document(&bot, &msg, &deps).await {
                    log::error!("Document handler failed for chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        })
}

/// Handler for attachments that arrive as inline media instead of documents
fn media_guidance_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| {
            msg.photo().is_some()
                || msg.video().is_some()
                || msg.audio().is_some()
                || msg.voice().is_some()
                || msg.video_note().is_some()
                || msg.animation().is_some()
                || msg.sticker().is_some()
        })
        .endpoint(move |bot: Bot, msg: Message| async move {
            if let Err(e) = handle_media_guidance(&bot, &msg).await {
                log::error!("Media guidance reply failed for chat {}: {}", msg.chat.id, e);
            }
            Ok(())
        })
}

/// Handler for plain text (the new base name)
fn text_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().map(|text| !text.starts_with('/')).unwrap_or(false))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let text = msg.text().unwrap_or_default().to_string();
                if let Err(e) = handle_new_name(&bot, &msg, &text, &deps).await {
                    log::error!("Text handler failed for chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        })
}

/// Handler for callback queries (Confirm/Cancel buttons)
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            let Some(action) = q.data.as_deref().and_then(RenameAction::parse) else {
                log::warn!("Ignoring unknown callback data: {:?}", q.data);
                let _ = bot.answer_callback_query(q.id.clone()).await;
                return Ok(());
            };

            if let Err(e) = handle_rename_action(&bot, &q, action, &deps).await {
                log::error!("Callback handler failed for user {}: {}", q.from.id, e);
            }
            Ok(())
        }
    })
}
