//! External behavior: a pointer to a tool run outside the engine
//!
//! External plugins document a third-party tool or manual procedure. The
//! engine neither launches nor monitors anything for them; the single
//! envelope carries the rendered guidance.

use crate::envelope::{Envelope, RunOutcome};
use crate::plugin::{PluginResult, PluginRuntime};

#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalBehavior;

impl ExternalBehavior {
    pub fn run(&self, runtime: &mut PluginRuntime) -> PluginResult<RunOutcome> {
        Ok(RunOutcome::Completed(vec![Envelope::html_string(
            &runtime.info().description,
        )]))
    }
}
