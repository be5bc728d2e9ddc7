//! Session-id-as-password authenticator.
//!
//! Clients present the session id returned by `/login` as the Basic password;
//! the username is ignored.

use std::sync::Arc;

use async_trait::async_trait;
use keeweb_session::{Payload, SessionStore};

use crate::auth::{Authenticator, Credentials};
use crate::error::ApiError;

pub struct SessionAuthenticator {
    sessions: Arc<SessionStore>,
}

impl SessionAuthenticator {
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl Authenticator for SessionAuthenticator {
    async fn check(&self, credentials: &Credentials) -> bool {
        self.sessions.exists(&credentials.password)
    }

    async fn resolve(&self, credentials: &Credentials) -> Result<Payload, ApiError> {
        Ok(self.sessions.load(&credentials.password)?)
    }
}
