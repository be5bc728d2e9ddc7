// ============================================================================
// Keeweb API - Authentication Gate
// File: crates/keeweb-api/src/auth/gate.rs
// ============================================================================
//! Check-then-resolve boundary between raw credentials and session state.

use std::sync::Arc;

use async_trait::async_trait;
use keeweb_session::Payload;
use tracing::{debug, warn};

use crate::auth::Credentials;
use crate::context::RequestContext;
use crate::error::ApiError;

/// Session lookups backing a protected route.
///
/// Both calls must leave the store untouched apart from the activity refresh
/// that `resolve` performs.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Cheap existence check.
    async fn check(&self, credentials: &Credentials) -> bool;

    /// Materializes the session payload. Only called after `check` succeeded.
    async fn resolve(&self, credentials: &Credentials) -> Result<Payload, ApiError>;
}

#[derive(Clone)]
pub struct AuthenticationGate {
    authenticator: Arc<dyn Authenticator>,
    realm: Arc<str>,
}

impl AuthenticationGate {
    pub fn new(authenticator: Arc<dyn Authenticator>, realm: impl Into<String>) -> Self {
        Self {
            authenticator,
            realm: Arc::from(realm.into()),
        }
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Performs one `check` and, on success, one `resolve`, then attaches the
    /// payload to the context as its session.
    pub async fn admit(&self, ctx: &mut RequestContext) -> Result<(), ApiError> {
        let Some(credentials) = ctx.credentials() else {
            debug!("No credentials on {} {}", ctx.method(), ctx.uri().path());
            ctx.challenge(&self.realm);
            return Err(ApiError::AuthenticationRequired(
                "Authorization required".to_string(),
            ));
        };

        if !self.authenticator.check(&credentials).await {
            warn!("Rejected credentials on {} {}", ctx.method(), ctx.uri().path());
            ctx.challenge(&self.realm);
            return Err(ApiError::InvalidCredentials(
                "Invalid credentials were provided.".to_string(),
            ));
        }

        let session = self.authenticator.resolve(&credentials).await?;
        ctx.set_session(session);
        Ok(())
    }
}
