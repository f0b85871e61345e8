//! Plugin worker: drives a batch of plugin declarations to completion
//!
//! One worker runs plugins strictly sequentially. Between invocations it
//! polls its control queue and the framework abort flag; a plugin abort
//! only costs the current plugin, a framework abort or stop request skips
//! everything still pending. Every outcome that produced envelopes, partial
//! or not, is delivered to the report sink.

use crate::core::abort::{AbortController, AbortKind};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::reconfigure_logging;
use crate::envelope::RunOutcome;
use crate::plugin::{PluginContext, PluginDecl, PluginRegistry};
use crate::store::ReportSink;
use crate::worker::control::{control_channel, ControlHandle, ControlQueue};
use std::sync::Arc;

/// Explicit worker configuration
#[derive(Debug, Clone, Default)]
pub struct WorkerConfig {
    pub worker_id: usize,
    /// Log level override applied when the worker starts, e.g. "debug"
    pub log_level: Option<String>,
}

/// What happened to each plugin in the batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerSummary {
    pub completed: usize,
    /// Plugin runs that ended in an abort of either scope
    pub aborted: usize,
    pub failed: usize,
    pub skipped: usize,
    /// True when a framework abort or stop request cut the batch short
    pub framework_aborted: bool,
}

pub struct PluginWorker {
    config: WorkerConfig,
    ctx: PluginContext,
    registry: Arc<PluginRegistry>,
    sink: Arc<dyn ReportSink>,
    abort: AbortController,
    control: ControlQueue,
}

impl PluginWorker {
    /// Build a worker and the control handle its owner keeps
    pub fn new(
        config: WorkerConfig,
        ctx: PluginContext,
        registry: Arc<PluginRegistry>,
        sink: Arc<dyn ReportSink>,
        abort: AbortController,
    ) -> (Self, ControlHandle) {
        let (handle, control) = control_channel();
        let worker = Self {
            config,
            ctx,
            registry,
            sink,
            abort,
            control,
        };
        (worker, handle)
    }

    pub fn abort_controller(&self) -> &AbortController {
        &self.abort
    }

    /// Run the batch sequentially, delivering every envelope batch produced
    pub async fn run(mut self, batch: Vec<PluginDecl>) -> WorkerSummary {
        log::info!(
            "Worker {} starting with {} plugin(s)",
            self.config.worker_id,
            batch.len()
        );
        self.ctx.reconnect();
        if let Some(level) = &self.config.log_level {
            if let Err(e) = reconfigure_logging(Some(level.as_str())) {
                log::warn!("Worker {}: log level not applied: {}", self.config.worker_id, e);
            }
        }

        let mut summary = WorkerSummary::default();
        let total = batch.len();
        for (index, decl) in batch.into_iter().enumerate() {
            if self.control.stop_requested() || self.abort.is_framework_aborted() {
                summary.framework_aborted = true;
                summary.skipped = total - index;
                log::info!(
                    "Worker {} stopping, {} plugin(s) skipped",
                    self.config.worker_id,
                    summary.skipped
                );
                break;
            }

            // A previous plugin abort must not leak into this run
            self.abort.reset_plugin();
            let mut token = self.abort.token();

            let mut plugin = match self.registry.instantiate(&decl, self.ctx.clone()) {
                Ok(plugin) => plugin,
                Err(e) => {
                    log_error_with_context(
                        &e,
                        &format!("Plugin '{}' could not be constructed", decl.code),
                    );
                    summary.failed += 1;
                    continue;
                }
            };

            match plugin.run(&mut token).await {
                Ok(RunOutcome::Completed(envelopes)) => {
                    self.sink.deliver(&decl.code, envelopes).await;
                    summary.completed += 1;
                }
                Ok(RunOutcome::Aborted {
                    kind: AbortKind::Plugin,
                    partial,
                }) => {
                    self.sink.deliver(&decl.code, partial).await;
                    summary.aborted += 1;
                }
                Ok(RunOutcome::Aborted {
                    kind: AbortKind::Framework,
                    partial,
                }) => {
                    self.sink.deliver(&decl.code, partial).await;
                    summary.aborted += 1;
                    summary.framework_aborted = true;
                    summary.skipped = total - index - 1;
                    break;
                }
                Err(e) => {
                    log_error_with_context(&e, &format!("Plugin '{}' failed", decl.code));
                    summary.failed += 1;
                }
            }
        }

        log::info!(
            "Worker {} done: {} completed, {} aborted, {} failed, {} skipped",
            self.config.worker_id,
            summary.completed,
            summary.aborted,
            summary.failed,
            summary.skipped
        );
        summary
    }

    /// Run the batch as a detached task
    ///
    /// Fire-and-forget: the task survives the caller but not the process.
    /// External commands spawned by a still-running plugin are killed when
    /// their runner is dropped, so nothing is orphaned past process exit.
    pub fn detach(self, batch: Vec<PluginDecl>) -> tokio::task::JoinHandle<WorkerSummary> {
        log::info!(
            "Worker {} detached with {} plugin(s); it will not outlive the process",
            self.config.worker_id,
            batch.len()
        );
        tokio::spawn(self.run(batch))
    }
}
