//! The three rename-flow event handlers: document received, new name
//! received, Confirm/Cancel button pressed.

use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile, Message, MessageId};
use tokio::io::AsyncWriteExt;

use crate::core::error::AppResult;
use crate::rename::{ConfirmOutcome, Session};
use crate::telegram::callback::{confirm_keyboard, RenameAction};
use crate::telegram::markdown::{edit_message_markdown_v2, send_message_markdown_v2};
use crate::telegram::schema::HandlerDeps;

const EXPIRED_TEXT: &str = "Session expired\\. Please resend your file\\.";

/// Telegram user id of the message sender, falling back to the chat id
/// for updates without a `from` field.
pub fn sender_id(msg: &Message) -> i64 {
    msg.from
        .as_ref()
        .and_then(|u| i64::try_from(u.id.0).ok())
        .unwrap_or(msg.chat.id.0)
}

/// A document arrived: start a fresh session and ask for the new base name.
///
/// Any prior session for this user is overwritten unconditionally.
pub async fn handle_document(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> AppResult<()> {
    let Some(doc) = msg.document() else {
        // Inline media without a document handle; nothing to rename.
        return handle_media_guidance(bot, msg).await;
    };

    let user_id = sender_id(msg);
    let session = deps
        .sessions
        .begin(user_id, doc.file.id.0.clone(), doc.file_name.clone());

    log::info!(
        "📄 Document from user {}: {:?} (ext {:?})",
        user_id,
        session.original_name,
        session.extension
    );

    send_message_markdown_v2(
        bot,
        msg.chat.id,
        format!(
            "Original file: `{}`\n\nSend me the new name *without the extension*\\.",
            session.original_name
        ),
        None,
    )
    .await?;
    Ok(())
}

/// An attachment arrived as inline media (photo, video, voice, ...) rather
/// than a document: guide the user, mutate nothing.
pub async fn handle_media_guidance(bot: &Bot, msg: &Message) -> AppResult<()> {
    bot.send_message(msg.chat.id, "Please send the file as a document.").await?;
    Ok(())
}

/// Plain text arrived: treat it as the new base name if a session exists.
pub async fn handle_new_name(bot: &Bot, msg: &Message, text: &str, deps: &HandlerDeps) -> AppResult<()> {
    let user_id = sender_id(msg);

    let Some(full_name) = deps.sessions.choose_name(user_id, text) else {
        send_message_markdown_v2(
            bot,
            msg.chat.id,
            "I don't have a file from you yet\\. Send me the document first\\.",
            None,
        )
        .await?;
        return Ok(());
    };

    send_message_markdown_v2(
        bot,
        msg.chat.id,
        format!("New filename will be: `{}`\nConfirm?", full_name),
        Some(confirm_keyboard()),
    )
    .await?;
    Ok(())
}

/// A Confirm/Cancel button was pressed.
pub async fn handle_rename_action(bot: &Bot, q: &CallbackQuery, action: RenameAction, deps: &HandlerDeps) -> AppResult<()> {
    // Stop the button spinner whatever happens next.
    bot.answer_callback_query(q.id.clone()).await?;

    let (Some(chat_id), Some(message_id)) = (
        q.message.as_ref().map(|m| m.chat().id),
        q.message.as_ref().map(|m| m.id()),
    ) else {
        log::warn!("Callback query {:?} has no attached message", q.id);
        return Ok(());
    };

    let user_id = i64::try_from(q.from.id.0).unwrap_or(chat_id.0);

    match action {
        RenameAction::Cancel => {
            let existed = deps.sessions.cancel(user_id);
            let text = if existed { "❌ Rename cancelled\\." } else { EXPIRED_TEXT };
            edit_message_markdown_v2(bot, chat_id, message_id, text).await?;
        }
        RenameAction::Confirm => match deps.sessions.take_confirmed(user_id) {
            ConfirmOutcome::Expired => {
                edit_message_markdown_v2(bot, chat_id, message_id, EXPIRED_TEXT).await?;
            }
            ConfirmOutcome::NotConfirmed => {
                // Stale button from a previous flow; the fresh session is
                // still waiting for its name.
                edit_message_markdown_v2(bot, chat_id, message_id, "Send me the new name for the file first\\.").await?;
            }
            ConfirmOutcome::Ready(session) => {
                confirm_rename(bot, chat_id, message_id, user_id, session, deps).await?;
            }
        },
    }
    Ok(())
}

/// Carries out a confirmed rename: download, rename, send back, clean up.
///
/// The session was already popped, so any failure here leaves no stuck
/// state; the user is told to resend and start over.
async fn confirm_rename(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    user_id: i64,
    session: Session,
    deps: &HandlerDeps,
) -> AppResult<()> {
    // The pop guaranteed the session carries a chosen name.
    let Some(new_name) = session.new_name().map(str::to_string) else {
        log::error!("Confirmed session for user {} has no pending name", user_id);
        edit_message_markdown_v2(bot, chat_id, message_id, EXPIRED_TEXT).await?;
        return Ok(());
    };

    match deliver_renamed(bot, chat_id, user_id, &session, &new_name, deps).await {
        Ok(()) => {
            edit_message_markdown_v2(
                bot,
                chat_id,
                message_id,
                format!("✅ File renamed and sent as `{}`\\.", new_name),
            )
            .await?;
        }
        Err(e) => {
            log::error!("Rename delivery failed for user {}: {}", user_id, e);
            edit_message_markdown_v2(
                bot,
                chat_id,
                message_id,
                "⚠️ Something went wrong while renaming\\. Please resend the file and try again\\.",
            )
            .await?;
        }
    }
    Ok(())
}

/// Download the original bytes into a private scratch directory, rename
/// them, and send the result back as a document.
///
/// The scratch directory is removed when `space` drops, on success and on
/// every failure path alike.
async fn deliver_renamed(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    session: &Session,
    new_name: &str,
    deps: &HandlerDeps,
) -> AppResult<()> {
    let space = deps.scratch.begin(user_id, &session.extension).await?;

    let file = bot.get_file(FileId(session.file_id.clone())).await?;
    let mut dst = fs_err::tokio::File::create(space.download_path()).await?;
    bot.download_file(&file.path, &mut dst).await?;
    dst.flush().await?;
    drop(dst);

    let final_path = space.rename_to(new_name).await?;

    log::info!("📤 Sending renamed file {:?} to chat {}", new_name, chat_id.0);
    bot.send_document(chat_id, InputFile::file(final_path).file_name(new_name.to_string()))
        .await?;

    Ok(())
}
