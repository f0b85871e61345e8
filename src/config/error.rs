//! Configuration Error Types

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings: {message}")]
    Parse { message: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse {
            message: err.to_string(),
        }
    }
}

impl crate::core::error_handling::ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        match self {
            ConfigError::Parse { .. } => true, // User can fix the settings file
            ConfigError::Io { .. } => false,   // System IO issues
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::Parse { message } => Some(message),
            _ => None,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
