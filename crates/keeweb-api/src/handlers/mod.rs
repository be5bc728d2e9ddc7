//! Route groups and their pipeline steps.

pub mod authentication;
pub mod database;
pub mod health;

use keeweb_shared::AppError;

use crate::server::RestServer;

pub use authentication::{AuthenticationRoutes, CheckCredentials, Logout, RequestAuthentication};
pub use database::{DatabaseRoutes, GetEntries, GetGroups};

/// A set of related routes registered together.
pub trait RouteGroup {
    fn name(&self) -> &'static str;

    fn implement(&self, server: &mut RestServer) -> Result<(), AppError>;
}
