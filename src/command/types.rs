//! Execution result types

use crate::core::abort::AbortKind;
use std::time::Duration;

/// Who, if anyone, aborted a command invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortedBy {
    None,
    Plugin,
    Framework,
}

impl From<AbortKind> for AbortedBy {
    fn from(kind: AbortKind) -> Self {
        match kind {
            AbortKind::Plugin => AbortedBy::Plugin,
            AbortKind::Framework => AbortedBy::Framework,
        }
    }
}

impl AbortedBy {
    pub fn abort_kind(self) -> Option<AbortKind> {
        match self {
            AbortedBy::None => None,
            AbortedBy::Plugin => Some(AbortKind::Plugin),
            AbortedBy::Framework => Some(AbortKind::Framework),
        }
    }
}

/// Outcome of one command invocation
///
/// Created fresh inside the command runner, consumed immediately by the
/// plugin to build an envelope, then discarded. A non-zero exit status is
/// not an error: the raw output and status both go to the plugin, which
/// decides what the report should say about them.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Template after placeholder substitution
    pub modified_command: String,
    /// Accumulated combined output; partial if the run was aborted
    pub raw_output: String,
    /// Wall-clock time from invocation to return or abort; advisory only
    pub elapsed: Duration,
    pub aborted_by: AbortedBy,
    /// Exit code if the process ran to completion and reported one
    pub exit_status: Option<i32>,
}

impl ExecutionResult {
    pub fn was_aborted(&self) -> bool {
        self.aborted_by != AbortedBy::None
    }
}
