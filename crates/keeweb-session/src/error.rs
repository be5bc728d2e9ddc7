//! Session errors

use thiserror::Error;

use crate::store::redact;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session does not exist: {}", redact(.0))]
    NotFound(String),
}
