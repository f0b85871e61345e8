//! Plugin execution core
//!
//! Defines what a plugin is, how it is configured, how its external
//! commands are launched, and how heterogeneous output shapes normalize
//! into envelope sequences. One parametrized variant set replaces a class
//! hierarchy: [`core::Plugin`] composes the shared lifecycle
//! ([`runtime::PluginRuntime`]) with a [`core::PluginBehavior`] strategy.

pub mod active;
pub mod context;
pub mod core;
pub mod error;
pub mod external;
pub mod grep;
pub mod passive;
pub mod registry;
pub mod runtime;
pub mod semi_passive;
pub mod types;

pub use context::PluginContext;
pub use self::core::{Plugin, PluginBehavior};
pub use error::{PluginError, PluginResult};
pub use registry::{PluginDecl, PluginRegistry};
pub use runtime::{PluginRuntime, ResourceAcquisition};
pub use types::{PluginGroup, PluginInfo, PluginKind};
