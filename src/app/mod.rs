//! Application front-end: CLI parsing and run orchestration

pub mod cli;
pub mod error;
pub mod startup;

pub use error::{AppError, AppResult};
