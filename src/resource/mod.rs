//! Resource Resolver
//!
//! Maps symbolic resource names to ordered groups of command templates.
//! Resolution is a pure lookup against the backing store; placeholder
//! substitution is deferred to the command runner.

mod error;
mod store;
mod types;

pub use error::{ResourceError, ResourceResult};
pub use store::ResourceStore;
pub use types::{Resource, ResourceHandle, ResourceSpec};
