//! Resource Error Types

#[derive(Debug, Clone, thiserror::Error)]
pub enum ResourceError {
    #[error("No resource registered under the name '{name}'")]
    NotFound { name: String },

    #[error("Invalid resource definitions: {message}")]
    Parse { message: String },
}

impl crate::core::error_handling::ContextualError for ResourceError {
    fn is_user_actionable(&self) -> bool {
        match self {
            ResourceError::Parse { .. } => true, // Fixable in the definitions file
            ResourceError::NotFound { .. } => false, // Caller logs context + skips plugin
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ResourceError::Parse { message } => Some(message),
            _ => None,
        }
    }
}

pub type ResourceResult<T> = Result<T, ResourceError>;
