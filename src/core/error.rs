use thiserror::Error;

/// Centralized error types for the application
///
/// Covers the failures of a confirmed rename: talking to the Bot API,
/// streaming the file down, and moving it on disk. User-input problems
/// (no document attached, missing session) are not errors; handlers
/// answer them with guidance messages directly.
#[derive(Error, Debug)]
pub enum AppError {
    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// File download errors (fetching bytes from the Bot API)
    #[error("Download error: {0}")]
    Download(#[from] teloxide::DownloadError),

    /// IO errors (scratch directory, rename, cleanup)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
