//! Callback data for the Confirm/Cancel inline keyboard.
//!
//! The button payload is a closed two-value enum rather than free-form
//! strings, so the dispatch in the callback handler is exhaustive.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// The two choices offered once a new filename has been composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameAction {
    Confirm,
    Cancel,
}

impl RenameAction {
    /// Wire form carried in `callback_data`.
    pub const fn as_data(self) -> &'static str {
        match self {
            RenameAction::Confirm => "confirm",
            RenameAction::Cancel => "cancel",
        }
    }

    /// Parses incoming `callback_data`; anything unknown is `None`.
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "confirm" => Some(RenameAction::Confirm),
            "cancel" => Some(RenameAction::Cancel),
            _ => None,
        }
    }
}

/// One button per row, Confirm on top, matching the prompt message.
pub fn confirm_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "✅ Confirm Rename",
            RenameAction::Confirm.as_data(),
        )],
        vec![InlineKeyboardButton::callback("❌ Cancel", RenameAction::Cancel.as_data())],
    ])
}
