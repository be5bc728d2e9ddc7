// ============================================================================
// Keeweb Core - Authentication Service
// File: crates/keeweb-core/src/services/auth_service.rs
// ============================================================================
//! Opening a database into a new session, and closing sessions.

use std::sync::Arc;

use keeweb_session::{Payload, SessionId, SessionStore};
use tracing::{info, warn};

use crate::domain::Database;
use crate::error::DomainError;
use crate::loader::DatabaseLoader;

/// Payload key holding the `Arc<Database>` of a logged-in session.
pub const DATABASE_KEY: &str = "database";

pub struct AuthService {
    sessions: Arc<SessionStore>,
    loader: Arc<dyn DatabaseLoader>,
}

impl AuthService {
    pub fn new(sessions: Arc<SessionStore>, loader: Arc<dyn DatabaseLoader>) -> Self {
        Self { sessions, loader }
    }

    /// Opens `locator` with `secret` and returns the id of a new session holding it.
    ///
    /// Every loader failure becomes `InvalidCredentials`; the cause is only logged.
    pub async fn login(&self, locator: &str, secret: &str) -> Result<SessionId, DomainError> {
        let database = self.loader.load(secret, locator).await.map_err(|e| {
            warn!("Login failed for database {}: {}", locator, e);
            DomainError::InvalidCredentials
        })?;

        let sid = self.sessions.create();
        let mut payload = Payload::new();
        payload.insert_shared(DATABASE_KEY, Arc::new(database));
        self.sessions
            .save(&sid, payload)
            .map_err(|e| DomainError::InternalError(e.to_string()))?;

        info!("Login successful for database {}", locator);
        Ok(sid)
    }

    /// Idempotent; returns the ids that were actually removed.
    pub fn logout(&self, sid: &str) -> Vec<SessionId> {
        let destroyed = self.sessions.remove(sid);
        info!("Logout destroyed {} session(s)", destroyed.len());
        destroyed
    }

    /// Database attached to a session payload by `login`.
    pub fn database(payload: &Payload) -> Option<Arc<Database>> {
        payload.get_shared::<Database>(DATABASE_KEY)
    }
}
