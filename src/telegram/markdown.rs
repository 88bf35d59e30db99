use crate::core::utils::escape_markdown_v2;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, MessageId, ParseMode};
use teloxide::RequestError;

fn is_markdown_parse_error(err: &RequestError) -> bool {
    err.to_string().to_lowercase().contains("can't parse entities")
}

/// Send a MarkdownV2 message and auto-escape on parse errors.
///
/// File names end up inside backtick spans in most replies; a name that
/// happens to contain MarkdownV2 syntax would make Telegram reject the
/// whole message, so on a parse error the text is re-sent fully escaped.
pub async fn send_message_markdown_v2(
    bot: &Bot,
    chat_id: ChatId,
    text: impl Into<String>,
    keyboard: Option<InlineKeyboardMarkup>,
) -> ResponseResult<Message> {
    let raw_text = text.into();
    let mut req = bot
        .send_message(chat_id, raw_text.clone())
        .parse_mode(ParseMode::MarkdownV2);
    if let Some(kb) = keyboard.clone() {
        req = req.reply_markup(kb);
    }

    match req.await {
        Ok(msg) => Ok(msg),
        Err(e) if is_markdown_parse_error(&e) => {
            let escaped = escape_markdown_v2(&raw_text);
            let mut retry = bot.send_message(chat_id, escaped).parse_mode(ParseMode::MarkdownV2);
            if let Some(kb) = keyboard {
                retry = retry.reply_markup(kb);
            }
            retry.await
        }
        Err(e) => Err(e),
    }
}

/// Edit a message to MarkdownV2 text with the same auto-escape fallback.
pub async fn edit_message_markdown_v2(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    text: impl Into<String>,
) -> ResponseResult<Message> {
    let raw_text = text.into();
    match bot
        .edit_message_text(chat_id, message_id, raw_text.clone())
        .parse_mode(ParseMode::MarkdownV2)
        .await
    {
        Ok(msg) => Ok(msg),
        Err(e) if is_markdown_parse_error(&e) => {
            bot.edit_message_text(chat_id, message_id, escape_markdown_v2(&raw_text))
                .parse_mode(ParseMode::MarkdownV2)
                .await
        }
        Err(e) => Err(e),
    }
}
