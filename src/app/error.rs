//! Application-level error aggregation

use crate::app::cli::CliError;
use crate::config::ConfigError;
use crate::core::error_handling::ContextualError;
use crate::plugin::PluginError;
use crate::resource::ResourceError;

/// Everything that can end a run before or outside plugin execution
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Cli(#[from] CliError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error("Failed to write report {path}: {source}")]
    Report {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContextualError for AppError {
    fn is_user_actionable(&self) -> bool {
        match self {
            AppError::Cli(inner) => inner.is_user_actionable(),
            AppError::Config(inner) => inner.is_user_actionable(),
            AppError::Resource(inner) => inner.is_user_actionable(),
            AppError::Plugin(inner) => inner.is_user_actionable(),
            AppError::Report { .. } => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            AppError::Cli(inner) => inner.user_message(),
            AppError::Config(inner) => inner.user_message(),
            AppError::Resource(inner) => inner.user_message(),
            AppError::Plugin(inner) => inner.user_message(),
            AppError::Report { .. } => None,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
