//! Command Runner Error Types

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed while waiting on '{command}': {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl crate::core::error_handling::ContextualError for CommandError {
    fn is_user_actionable(&self) -> bool {
        false // Spawn/wait failures are system errors; tool exit codes are not errors at all
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

pub type CommandResult<T> = Result<T, CommandError>;
