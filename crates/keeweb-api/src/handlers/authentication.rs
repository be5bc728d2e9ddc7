// ============================================================================
// Keeweb API - Authentication Routes
// File: crates/keeweb-api/src/handlers/authentication.rs
// ============================================================================
//! Login and logout routes.
//!
//! `GET /login/{dbname}` takes the database secret as the Basic password and
//! answers with a session id. Later requests present that id as their Basic
//! password; `GET /logout` destroys it.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Json;
use keeweb_core::AuthService;
use keeweb_session::SessionId;
use keeweb_shared::AppError;
use serde::Serialize;
use tracing::debug;

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::handlers::RouteGroup;
use crate::pipeline::{Completion, Next, Pipeline, Step};
use crate::response::ApiResponse;
use crate::server::RestServer;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub sid: SessionId,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub destroyed: Vec<SessionId>,
}

/// Challenges requests that carry no Basic password.
pub struct RequestAuthentication {
    realm: String,
}

impl RequestAuthentication {
    pub fn new(realm: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
        }
    }
}

#[async_trait]
impl Step for RequestAuthentication {
    async fn run(&self, ctx: &mut RequestContext, next: Next) -> Completion {
        if ctx.credentials().is_some() {
            return next.proceed();
        }
        ctx.challenge(&self.realm);
        next.fail(ApiError::AuthenticationRequired(
            "Authorization required".to_string(),
        ))
    }
}

/// Opens the `dbname` database with the Basic password and starts a session.
pub struct CheckCredentials {
    auth_service: Arc<AuthService>,
    realm: String,
}

impl CheckCredentials {
    pub fn new(auth_service: Arc<AuthService>, realm: impl Into<String>) -> Self {
        Self {
            auth_service,
            realm: realm.into(),
        }
    }
}

#[async_trait]
impl Step for CheckCredentials {
    async fn run(&self, ctx: &mut RequestContext, next: Next) -> Completion {
        let Some(dbname) = ctx.param("dbname").map(str::to_string) else {
            return next.fail(ApiError::InvalidArgument(
                "No database specified.".to_string(),
            ));
        };
        let Some(credentials) = ctx.credentials() else {
            ctx.challenge(&self.realm);
            return next.fail(ApiError::AuthenticationRequired(
                "Authorization required".to_string(),
            ));
        };

        match self.auth_service.login(&dbname, &credentials.password).await {
            Ok(sid) => {
                debug!("Session opened for database {}", dbname);
                next.respond(Json(ApiResponse::success(LoginResponse { sid })))
            }
            Err(err) => {
                ctx.challenge(&self.realm);
                next.fail(err)
            }
        }
    }
}

/// Destroys the session named by the Basic password.
pub struct Logout {
    auth_service: Arc<AuthService>,
}

impl Logout {
    pub fn new(auth_service: Arc<AuthService>) -> Self {
        Self { auth_service }
    }
}

#[async_trait]
impl Step for Logout {
    async fn run(&self, ctx: &mut RequestContext, next: Next) -> Completion {
        let Some(credentials) = ctx.credentials() else {
            return next.fail(ApiError::AuthenticationRequired(
                "No session exists.".to_string(),
            ));
        };

        let destroyed = self.auth_service.logout(&credentials.password);
        next.respond(Json(ApiResponse::success(LogoutResponse { destroyed })))
    }
}

pub struct AuthenticationRoutes {
    auth_service: Arc<AuthService>,
    realm: String,
}

impl AuthenticationRoutes {
    pub fn new(state: &AppState) -> Self {
        Self {
            auth_service: state.auth_service.clone(),
            realm: state.config.app.realm.clone(),
        }
    }
}

impl RouteGroup for AuthenticationRoutes {
    fn name(&self) -> &'static str {
        "authentication"
    }

    fn implement(&self, server: &mut RestServer) -> Result<(), AppError> {
        server.get(
            "/login/{dbname}",
            Pipeline::new()
                .step(RequestAuthentication::new(self.realm.clone()))
                .step(CheckCredentials::new(
                    self.auth_service.clone(),
                    self.realm.clone(),
                )),
        )?;
        server.get(
            "/logout",
            Pipeline::new().step(Logout::new(self.auth_service.clone())),
        )?;
        Ok(())
    }
}
