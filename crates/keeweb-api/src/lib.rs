//! # Keeweb API
//!
//! Credential-gated REST surface: ordered request pipelines, the session
//! authentication gate, route implementations and router assembly.

pub mod app;
pub mod auth;
pub mod context;
pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod response;
pub mod server;
pub mod state;

pub use app::build_router;
pub use context::RequestContext;
pub use error::ApiError;
pub use pipeline::{Completion, Next, Pipeline, Step};
pub use server::RestServer;
pub use state::AppState;
