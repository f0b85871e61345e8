//! Command Runner
//!
//! Substitutes placeholders into a command template, executes the result as
//! a monitored child process with incremental output capture, and converts
//! external abort signals into typed results carrying partial output.

mod error;
mod runner;
mod types;

pub use error::{CommandError, CommandResult};
pub use runner::CommandRunner;
pub use types::{AbortedBy, ExecutionResult};
