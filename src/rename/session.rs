//! Per-user rename sessions.
//!
//! A session is created when a document arrives, advances when the user
//! sends the new base name, and is destroyed by Confirm or Cancel. The
//! `Idle` state of the workflow is represented by absence from the store.
//!
//! All transitions are single [`DashMap`] operations, so concurrent events
//! for the same user serialize on the shard lock: a rapid double-tap of
//! Confirm pops the session exactly once and the loser sees it expired.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::config;
use crate::core::utils::escape_filename;

/// Where a session stands in the rename workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Document received, waiting for the user to send the new base name.
    AwaitingName,
    /// Name chosen, waiting for the Confirm/Cancel button.
    /// `new_name` is the full candidate filename, extension included.
    AwaitingConfirmation { new_name: String },
}

/// One in-progress rename request.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque Telegram file handle used to fetch the original bytes.
    pub file_id: String,
    /// Filename as supplied by the sender (or the fallback literal).
    pub original_name: String,
    /// Suffix of `original_name` including the leading dot; fixed at
    /// document-receipt time and never recomputed.
    pub extension: String,
    pub state: SessionState,
    created_at: Instant,
}

impl Session {
    /// The pending full filename, present only while awaiting confirmation.
    pub fn new_name(&self) -> Option<&str> {
        match &self.state {
            SessionState::AwaitingConfirmation { new_name } => Some(new_name),
            SessionState::AwaitingName => None,
        }
    }
}

/// Outcome of popping a session for a Confirm press.
#[derive(Debug)]
pub enum ConfirmOutcome {
    /// Session was awaiting confirmation; it is now removed and owned by
    /// the caller, who must carry out the rename.
    Ready(Session),
    /// A session exists but no name was chosen yet (stale button after a
    /// new document restarted the flow). The session is left intact.
    NotConfirmed,
    /// No session for this user.
    Expired,
}

/// Computes the extension of a filename, leading dot included.
///
/// Follows the splitext convention: the suffix starts at the last dot,
/// except that a dot leading the whole name does not count (".bashrc" has
/// no extension). Returns an empty string when there is no separator.
pub fn file_extension(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) if idx > 0 && !name[..idx].chars().all(|c| c == '.') => name[idx..].to_string(),
        _ => String::new(),
    }
}

/// Concurrency-safe table of active sessions, keyed by Telegram user id.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<i64, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Starts a fresh session for a received document, unconditionally
    /// replacing any prior session for this user.
    ///
    /// Returns the stored session so the handler can echo the original name.
    pub fn begin(&self, user_id: i64, file_id: String, supplied_name: Option<String>) -> Session {
        let original_name = supplied_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| config::session::FALLBACK_FILE_NAME.to_string());
        let extension = file_extension(&original_name);

        let session = Session {
            file_id,
            original_name,
            extension,
            state: SessionState::AwaitingName,
            created_at: Instant::now(),
        };
        self.sessions.insert(user_id, session.clone());
        session
    }

    /// Records the user's chosen base name and returns the full candidate
    /// filename, or `None` when the user has no session.
    ///
    /// The base name is trimmed and scrubbed; the extension recorded at
    /// document-receipt time is appended as-is. Choosing a name again while
    /// already awaiting confirmation simply recomputes the candidate.
    pub fn choose_name(&self, user_id: i64, text: &str) -> Option<String> {
        let mut entry = self.sessions.get_mut(&user_id)?;
        let new_name = format!("{}{}", escape_filename(text.trim()), entry.extension);
        entry.state = SessionState::AwaitingConfirmation {
            new_name: new_name.clone(),
        };
        Some(new_name)
    }

    /// Pops the session for a Confirm press.
    ///
    /// The removal is conditional on the session actually awaiting
    /// confirmation, and atomic, so two concurrent Confirms hand the
    /// session to exactly one caller.
    pub fn take_confirmed(&self, user_id: i64) -> ConfirmOutcome {
        match self
            .sessions
            .remove_if(&user_id, |_, s| matches!(s.state, SessionState::AwaitingConfirmation { .. }))
        {
            Some((_, session)) => ConfirmOutcome::Ready(session),
            None if self.sessions.contains_key(&user_id) => ConfirmOutcome::NotConfirmed,
            None => ConfirmOutcome::Expired,
        }
    }

    /// Removes the session whatever its state. Returns whether one existed.
    pub fn cancel(&self, user_id: i64) -> bool {
        self.sessions.remove(&user_id).is_some()
    }

    /// Read-only snapshot of a user's session, for handlers and tests.
    pub fn get(&self, user_id: i64) -> Option<Session> {
        self.sessions.get(&user_id).map(|s| s.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Removes sessions older than `ttl`. Returns how many were dropped.
    pub fn sweep_expired(&self, ttl: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.created_at.elapsed() < ttl);
        before - self.sessions.len()
    }

    /// Spawns a background task that periodically sweeps abandoned
    /// sessions so the table cannot grow without bound.
    pub fn spawn_sweep_task(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick fires immediately
            loop {
                ticker.tick().await;
                let removed = self.sweep_expired(config::session::ttl());
                if removed > 0 {
                    log::info!("Swept {} expired rename session(s)", removed);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_file_extension_basic() {
        assert_eq!(file_extension("report.pdf"), ".pdf");
        assert_eq!(file_extension("archive.tar.gz"), ".gz");
        assert_eq!(file_extension("README"), "");
    }

    #[test]
    fn test_file_extension_leading_dot_is_not_a_separator() {
        assert_eq!(file_extension(".bashrc"), "");
        assert_eq!(file_extension("..."), "");
        assert_eq!(file_extension(".config.toml"), ".toml");
    }

    #[test]
    fn test_begin_records_extension_once() {
        let store = SessionStore::new();
        let session = store.begin(1, "f1".into(), Some("report.pdf".into()));

        assert_eq!(session.extension, ".pdf");
        assert_eq!(session.original_name, "report.pdf");
        assert_eq!(session.state, SessionState::AwaitingName);

        // Choosing a name must not recompute the extension, even when the
        // entered base name contains a dot of its own.
        let full = store.choose_name(1, "v2.final").unwrap();
        assert_eq!(full, "v2.final.pdf");
        assert_eq!(store.get(1).unwrap().extension, ".pdf");
    }

    #[test]
    fn test_begin_falls_back_to_file_literal() {
        let store = SessionStore::new();
        let session = store.begin(7, "f".into(), None);
        assert_eq!(session.original_name, "file");
        assert_eq!(session.extension, "");

        let empty = store.begin(8, "f".into(), Some(String::new()));
        assert_eq!(empty.original_name, "file");
    }

    #[test]
    fn test_begin_overwrites_prior_session() {
        let store = SessionStore::new();
        store.begin(1, "f1".into(), Some("a.txt".into()));
        store.choose_name(1, "renamed");

        let session = store.begin(1, "f2".into(), Some("b.md".into()));
        assert_eq!(session.file_id, "f2");
        assert_eq!(session.extension, ".md");
        assert_eq!(store.get(1).unwrap().state, SessionState::AwaitingName);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_choose_name_strips_whitespace_and_appends_extension() {
        let store = SessionStore::new();
        store.begin(1, "f".into(), Some("report.pdf".into()));

        let full = store.choose_name(1, "  final version  ").unwrap();
        assert_eq!(full, "final version.pdf");
        assert_eq!(store.get(1).unwrap().new_name(), Some("final version.pdf"));
    }

    #[test]
    fn test_choose_name_without_session() {
        let store = SessionStore::new();
        assert_eq!(store.choose_name(42, "anything"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_take_confirmed_pops_exactly_once() {
        let store = SessionStore::new();
        store.begin(1, "f".into(), Some("a.txt".into()));
        store.choose_name(1, "b");

        assert!(matches!(store.take_confirmed(1), ConfirmOutcome::Ready(_)));
        // Second Confirm with no intervening document: expired, not a repeat.
        assert!(matches!(store.take_confirmed(1), ConfirmOutcome::Expired));
    }

    #[test]
    fn test_take_confirmed_before_name_leaves_session_intact() {
        let store = SessionStore::new();
        store.begin(1, "f".into(), Some("a.txt".into()));

        assert!(matches!(store.take_confirmed(1), ConfirmOutcome::NotConfirmed));
        assert!(store.get(1).is_some());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let store = SessionStore::new();
        store.begin(1, "f".into(), Some("a.txt".into()));

        assert!(store.cancel(1));
        assert!(!store.cancel(1));
        assert!(matches!(store.take_confirmed(1), ConfirmOutcome::Expired));
    }

    #[test]
    fn test_sweep_expired() {
        let store = SessionStore::new();
        store.begin(1, "f1".into(), Some("a.txt".into()));
        store.begin(2, "f2".into(), Some("b.txt".into()));

        // Nothing is older than an hour.
        assert_eq!(store.sweep_expired(Duration::from_secs(3600)), 0);
        assert_eq!(store.len(), 2);

        // A zero TTL ages everything out.
        assert_eq!(store.sweep_expired(Duration::ZERO), 2);
        assert!(store.is_empty());
    }
}
