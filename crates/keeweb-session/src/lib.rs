//! # Keeweb Session
//!
//! In-memory session store keyed by random identifiers, with a background
//! sweeper that drops sessions idle for longer than the configured lifetime.

pub mod error;
pub mod payload;
pub mod store;
pub mod sweeper;

pub use error::SessionError;
pub use payload::Payload;
pub use store::{redact, SessionId, SessionStore};
pub use sweeper::spawn_sweeper;
