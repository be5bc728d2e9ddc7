use std::sync::Arc;

use keeweb_core::{AuthService, DatabaseLoader};
use keeweb_session::SessionStore;
use keeweb_shared::{AppConfig, AppError};

use crate::auth::{AuthenticationGate, Authenticator, SessionAuthenticator};

/// Collaborators shared by every route.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub sessions: Arc<SessionStore>,
    pub auth_service: Arc<AuthService>,
    pub gate: AuthenticationGate,
}

impl AppState {
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::default()
    }
}

#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<AppConfig>,
    sessions: Option<Arc<SessionStore>>,
    loader: Option<Arc<dyn DatabaseLoader>>,
    authenticator: Option<Arc<dyn Authenticator>>,
}

impl AppStateBuilder {
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn sessions(mut self, sessions: Arc<SessionStore>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn loader(mut self, loader: Arc<dyn DatabaseLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Replaces the default session-id authenticator.
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    pub fn build(self) -> Result<AppState, AppError> {
        let config = self.config.unwrap_or_default();
        let sessions = self
            .sessions
            .ok_or_else(|| AppError::module_not_loaded("session store"))?;
        let loader = self
            .loader
            .ok_or_else(|| AppError::module_not_loaded("database loader"))?;

        let authenticator = self
            .authenticator
            .unwrap_or_else(|| Arc::new(SessionAuthenticator::new(sessions.clone())));
        let gate = AuthenticationGate::new(authenticator, config.app.realm.clone());
        let auth_service = Arc::new(AuthService::new(sessions.clone(), loader));

        Ok(AppState {
            config,
            sessions,
            auth_service,
            gate,
        })
    }
}
