//! Worker Processing
//!
//! Drives batches of plugin declarations sequentially, wiring the abort
//! controller, the control queue and report delivery together. Parallelism,
//! when wanted, comes from running several workers over disjoint batches.

pub mod control;
pub mod process;

pub use control::{control_channel, ControlHandle, ControlQueue, ControlSignal};
pub use process::{PluginWorker, WorkerConfig, WorkerSummary};
