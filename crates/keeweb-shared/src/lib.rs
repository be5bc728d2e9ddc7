//! # Keeweb Shared
//!
//! Configuration, telemetry, setup errors and constants shared by every crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod telemetry;

pub use config::AppConfig;
pub use error::AppError;
