//! Plugin: shared lifecycle composed with a behavior strategy
//!
//! A single parametrized variant set replaces the original per-kind class
//! hierarchy: [`PluginBehavior`] tags the capability variant, and
//! [`Plugin::run`] dispatches it over the shared [`PluginRuntime`].

use crate::core::abort::AbortToken;
use crate::envelope::RunOutcome;
use crate::plugin::active::ActiveBehavior;
use crate::plugin::external::ExternalBehavior;
use crate::plugin::grep::GrepBehavior;
use crate::plugin::passive::PassiveBehavior;
use crate::plugin::semi_passive::SemiPassiveBehavior;
use crate::plugin::{
    PluginContext, PluginInfo, PluginResult, PluginRuntime, ResourceAcquisition,
};
use crate::plugin::types::{PluginGroup, PluginKind};
use std::time::Instant;

/// Capability variant, carrying variant-specific parameters
pub enum PluginBehavior {
    Active(ActiveBehavior),
    Passive(PassiveBehavior),
    SemiPassive(SemiPassiveBehavior),
    Grep(GrepBehavior),
    External(ExternalBehavior),
}

impl PluginBehavior {
    pub fn kind(&self) -> PluginKind {
        match self {
            PluginBehavior::Active(_) => PluginKind::Active,
            PluginBehavior::Passive(_) => PluginKind::Passive,
            PluginBehavior::SemiPassive(_) => PluginKind::SemiPassive,
            PluginBehavior::Grep(_) => PluginKind::Grep,
            PluginBehavior::External(_) => PluginKind::External,
        }
    }
}

/// A constructed plugin instance: single pass, no retries
///
/// `Constructed -> Running -> {Completed | PluginAborted | FrameworkAborted}`.
/// Configuration errors (invalid info, unresolvable resource names) surface
/// as `Err`; aborts surface as typed outcomes carrying partial envelopes.
pub struct Plugin {
    runtime: PluginRuntime,
    behavior: PluginBehavior,
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("runtime", &self.runtime)
            .field("kind", &self.behavior.kind())
            .finish()
    }
}

impl Plugin {
    pub fn new(
        ctx: PluginContext,
        info: PluginInfo,
        behavior: PluginBehavior,
        acquisition: ResourceAcquisition,
    ) -> PluginResult<Self> {
        let runtime = PluginRuntime::new(ctx, info, acquisition)?;
        Ok(Self { runtime, behavior })
    }

    pub fn info(&self) -> &PluginInfo {
        self.runtime.info()
    }

    pub fn group(&self) -> PluginGroup {
        self.runtime.group()
    }

    pub fn kind(&self) -> PluginKind {
        self.runtime.kind()
    }

    pub fn behavior(&self) -> &PluginBehavior {
        &self.behavior
    }

    /// Execute this plugin to completion or abort
    ///
    /// The returned envelope sequence is never empty; on abort it carries
    /// everything produced before the interruption.
    pub async fn run(&mut self, token: &mut AbortToken) -> PluginResult<RunOutcome> {
        let code = self.runtime.info().code.clone();
        log::info!(
            "Running plugin '{}' ({}/{})",
            code,
            self.runtime.group(),
            self.runtime.kind()
        );
        let start = Instant::now();

        let outcome = match &self.behavior {
            PluginBehavior::Active(b) => b.run(&mut self.runtime, token).await,
            PluginBehavior::Passive(b) => b.run(&mut self.runtime),
            PluginBehavior::SemiPassive(b) => b.run(&mut self.runtime, token).await,
            PluginBehavior::Grep(b) => b.run(&mut self.runtime),
            PluginBehavior::External(b) => b.run(&mut self.runtime),
        };

        let elapsed = start.elapsed();
        match &outcome {
            Ok(RunOutcome::Completed(envelopes)) => {
                log::info!(
                    "Plugin '{}' completed with {} envelope(s) in {:.2}s",
                    code,
                    envelopes.len(),
                    elapsed.as_secs_f64()
                );
            }
            Ok(RunOutcome::Aborted { kind, partial }) => {
                log::warn!(
                    "Plugin '{}' aborted ({:?} scope) after {:.2}s, {} partial envelope(s) kept",
                    code,
                    kind,
                    elapsed.as_secs_f64(),
                    partial.len()
                );
            }
            Err(e) => {
                log::debug!("Plugin '{}' failed: {}", code, e);
            }
        }
        outcome
    }
}
