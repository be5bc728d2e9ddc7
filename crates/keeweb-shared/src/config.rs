//! Configuration management

use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::constants::*;
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSettings,
    pub session: SessionSettings,
    pub database: DatabaseSettings,
    pub log: LogSettings,
    pub cors: CorsSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub host: String,
    pub port: u16,
    /// Realm announced in `WWW-Authenticate` challenges.
    pub realm: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_APP_NAME.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            realm: DEFAULT_REALM.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionSettings {
    pub lifetime_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            lifetime_secs: DEFAULT_SESSION_LIFETIME_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

impl SessionSettings {
    /// `None` when expiry is disabled.
    pub fn lifetime(&self) -> Option<Duration> {
        (self.lifetime_secs > 0).then(|| Duration::from_secs(self.lifetime_secs))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseSettings {
    pub directory: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            directory: DEFAULT_DATABASE_DIRECTORY.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
    /// Daily-rolling log files are written here when set.
    pub directory: Option<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json: false,
            directory: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct CorsSettings {
    /// Empty mirrors the request origin.
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins"),
            )
            .build()?;

        let settings: AppConfig = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.app.port == 0 {
            return Err(AppError::parameter("app.port", "Must be a valid port number."));
        }
        if self.app.realm.trim().is_empty() {
            return Err(AppError::parameter("app.realm", "Must not be empty."));
        }
        if self.session.sweep_interval_secs == 0 {
            return Err(AppError::parameter(
                "session.sweep_interval_secs",
                "Must be greater than zero.",
            ));
        }
        if self.database.directory.trim().is_empty() {
            return Err(AppError::parameter("database.directory", "Must not be empty."));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.app.port, 3000);
        assert_eq!(cfg.app.realm, "REST");
        assert_eq!(cfg.session.sweep_interval(), Duration::from_secs(10));
        assert!(cfg.session.lifetime().is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_lifetime_enabled() {
        let settings = SessionSettings {
            lifetime_secs: 900,
            ..Default::default()
        };
        assert_eq!(settings.lifetime(), Some(Duration::from_secs(900)));
    }

    #[test]
    fn test_validate_rejects_zero_sweep_interval() {
        let mut cfg = AppConfig::default();
        cfg.session.sweep_interval_secs = 0;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, AppError::Parameter { ref param, .. } if param == "session.sweep_interval_secs"));
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut cfg = AppConfig::default();
        cfg.app.port = 0;
        assert!(matches!(cfg.validate(), Err(AppError::Parameter { .. })));
    }

    #[test]
    fn test_partial_source_keeps_defaults() {
        let cfg: AppConfig = Config::builder()
            .set_override("app.port", 8080)
            .unwrap()
            .set_override("session.lifetime_secs", 60)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.app.port, 8080);
        assert_eq!(cfg.app.name, "keeweb");
        assert_eq!(cfg.session.lifetime(), Some(Duration::from_secs(60)));
        assert_eq!(cfg.session.sweep_interval_secs, 10);
    }
}
