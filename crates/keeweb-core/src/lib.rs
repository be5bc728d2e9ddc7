//! # Keeweb Core
//!
//! Database document model, the loader contract, and the login/logout service.

pub mod domain;
pub mod error;
pub mod loader;
pub mod secret;
pub mod services;

pub use domain::*;
pub use error::DomainError;
pub use loader::{DatabaseLoader, FileDatabaseLoader, LoadError};
pub use secret::SecretHash;
pub use services::AuthService;
