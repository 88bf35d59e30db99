use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the bot

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Scratch folder for in-flight downloads and renames
/// Read from DOWNLOAD_FOLDER environment variable
/// Default: downloads (relative to the working directory)
pub static DOWNLOAD_FOLDER: Lazy<String> =
    Lazy::new(|| env::var("DOWNLOAD_FOLDER").unwrap_or_else(|_| "downloads".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: app.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "app.log".to_string()));

/// Port for the HTTP liveness endpoint used by the hosting platform
/// Read from WEB_PORT environment variable
/// Default: 10000
pub static WEB_PORT: Lazy<u16> = Lazy::new(|| {
    env::var("WEB_PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(10000)
});

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API requests (in seconds)
    /// Generous because document uploads can be slow on large files
    pub const REQUEST_TIMEOUT_SECS: u64 = 900; // 15 minutes

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Rename session configuration
pub mod session {
    use super::Duration;

    /// Fallback name when the uploaded document carries no filename
    pub const FALLBACK_FILE_NAME: &str = "file";

    /// Time-to-live for an abandoned session (in seconds)
    pub const TTL_SECS: u64 = 60 * 60; // 1 hour

    /// Interval between sweeps of expired sessions (in seconds)
    pub const SWEEP_INTERVAL_SECS: u64 = 5 * 60; // 5 minutes

    /// Session time-to-live duration
    pub fn ttl() -> Duration {
        Duration::from_secs(TTL_SECS)
    }

    /// Sweep interval duration
    pub fn sweep_interval() -> Duration {
        Duration::from_secs(SWEEP_INTERVAL_SECS)
    }
}
