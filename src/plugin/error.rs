//! Plugin Error Handling
//!
//! Configuration errors fail fast and are not recoverable: the worker logs
//! them and skips the plugin. Aborts are not errors here; they travel as
//! typed run outcomes carrying partial envelopes.

use crate::command::CommandError;
use crate::resource::ResourceError;

#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Plugin '{code}': invalid {field} '{value}' in plugin info")]
    InvalidInfo {
        code: String,
        field: &'static str,
        value: String,
    },

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Plugin registry: {message}")]
    Registry { message: String },

    #[error("Plugin '{code}': unknown grep pattern '{pattern_name}'")]
    UnknownPattern { code: String, pattern_name: String },

    #[error("Plugin '{code}': bad grep pattern '{pattern_name}': {message}")]
    BadPattern {
        code: String,
        pattern_name: String,
        message: String,
    },

    #[error("Plugin '{code}': failed to initialise output directory {path}: {source}")]
    OutputDir {
        code: String,
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Plugin '{code}': failed to persist raw output: {source}")]
    OutputDump {
        code: String,
        #[source]
        source: std::io::Error,
    },
}

impl crate::core::error_handling::ContextualError for PluginError {
    fn is_user_actionable(&self) -> bool {
        match self {
            PluginError::InvalidInfo { .. }
            | PluginError::Registry { .. }
            | PluginError::UnknownPattern { .. }
            | PluginError::BadPattern { .. } => true,
            PluginError::Resource(inner) => inner.is_user_actionable(),
            PluginError::Command(_) | PluginError::OutputDir { .. } | PluginError::OutputDump { .. } => {
                false
            }
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            PluginError::Registry { message } => Some(message),
            PluginError::Resource(inner) => inner.user_message(),
            _ => None,
        }
    }
}

pub type PluginResult<T> = Result<T, PluginError>;
