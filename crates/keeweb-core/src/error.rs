//! Domain errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Credentials are invalid.")]
    InvalidCredentials,

    #[error("Group with specified ID not found: {0}")]
    GroupNotFound(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
