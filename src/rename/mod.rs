//! The rename workflow: per-user sessions and scratch-space management

pub mod scratch;
pub mod session;

// Re-exports for convenience
pub use scratch::{ScratchSpace, ScratchStore};
pub use session::{ConfirmOutcome, Session, SessionState, SessionStore};
