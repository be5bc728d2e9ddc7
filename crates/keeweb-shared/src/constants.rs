//! Application-wide constants

pub const DEFAULT_APP_NAME: &str = "keeweb";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_REALM: &str = "REST";
/// Session lifetime in seconds; 0 keeps sessions until they are removed.
pub const DEFAULT_SESSION_LIFETIME_SECS: u64 = 0;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_DATABASE_DIRECTORY: &str = "databases";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const ENV_PREFIX: &str = "KEEWEB";
