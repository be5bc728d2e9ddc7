//! Setup-time error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Error in Parameter '{param}': {message}")]
    Parameter { param: String, message: String },

    #[error("Module is required but was not loaded: {0}")]
    ModuleNotLoaded(String),
}

impl AppError {
    pub fn parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parameter {
            param: param.into(),
            message: message.into(),
        }
    }

    pub fn module_not_loaded(name: impl Into<String>) -> Self {
        Self::ModuleNotLoaded(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_message() {
        let err = AppError::parameter("port", "Must be a number.");
        assert_eq!(err.to_string(), "Error in Parameter 'port': Must be a number.");
    }

    #[test]
    fn test_module_not_loaded_message() {
        let err = AppError::module_not_loaded("session store");
        assert_eq!(
            err.to_string(),
            "Module is required but was not loaded: session store"
        );
    }
}
