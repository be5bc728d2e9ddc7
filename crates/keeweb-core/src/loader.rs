// ============================================================================
// Keeweb Core - Database Loader
// File: crates/keeweb-core/src/loader.rs
// ============================================================================
//! Loading a password database from a secret and a locator.
//!
//! `FileDatabaseLoader` reads JSON envelopes from a single directory:
//!
//! ```json
//! { "password_hash": "$argon2id$...", "groups": { "<gid>": { ... } } }
//! ```
//!
//! The secret is checked against the Argon2 hash before the document is
//! handed out.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::Database;
use crate::secret::SecretHash;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Invalid database locator: {0}")]
    InvalidLocator(String),

    #[error("Database could not be read: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database could not be decoded: {0}")]
    Decode(String),

    #[error("Wrong secret")]
    WrongSecret,
}

/// Opens a database given a secret. Callers must not tell the client which
/// variant of `LoadError` occurred.
#[async_trait]
pub trait DatabaseLoader: Send + Sync {
    async fn load(&self, secret: &str, locator: &str) -> Result<Database, LoadError>;
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    password_hash: SecretHash,
    #[serde(flatten)]
    database: Database,
}

#[derive(Debug, Clone)]
pub struct FileDatabaseLoader {
    directory: PathBuf,
}

impl FileDatabaseLoader {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Maps a locator to a file inside the directory. Only bare file names are accepted.
    pub fn resolve(&self, locator: &str) -> Result<PathBuf, LoadError> {
        let is_bare_name = !locator.is_empty()
            && locator != "."
            && locator != ".."
            && !locator.contains(['/', '\\', '\0']);
        if !is_bare_name {
            return Err(LoadError::InvalidLocator(locator.to_string()));
        }
        Ok(self.directory.join(locator))
    }

    /// Writes `database` to `path`, protected by `secret`.
    pub fn seal(path: &Path, secret: &str, database: &Database) -> Result<(), LoadError> {
        let envelope = Envelope {
            password_hash: SecretHash::seal(secret)?,
            database: database.clone(),
        };
        let bytes =
            serde_json::to_vec_pretty(&envelope).map_err(|e| LoadError::Decode(e.to_string()))?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[async_trait]
impl DatabaseLoader for FileDatabaseLoader {
    async fn load(&self, secret: &str, locator: &str) -> Result<Database, LoadError> {
        let path = self.resolve(locator)?;
        debug!("Loading database from {}", path.display());

        let bytes = tokio::fs::read(&path).await?;
        let envelope: Envelope =
            serde_json::from_slice(&bytes).map_err(|e| LoadError::Decode(e.to_string()))?;

        // Argon2 is CPU bound
        let secret = secret.to_string();
        let hash = envelope.password_hash;
        tokio::task::spawn_blocking(move || hash.verify(&secret))
            .await
            .map_err(|e| LoadError::Decode(e.to_string()))??;

        Ok(envelope.database)
    }
}
