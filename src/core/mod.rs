//! Cross-cutting concerns shared by every subsystem
//!
//! Logging sinks, the user-actionable/system error split, abort
//! coordination and small string helpers live here. Domain logic does not.

pub mod abort;
pub mod error_handling;
pub mod logging;
pub mod strings;
