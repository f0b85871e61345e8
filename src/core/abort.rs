//! Abort Coordination
//!
//! Two cancellation scopes drive the plugin execution core: a plugin abort
//! unwinds only the currently running plugin, a framework abort unwinds the
//! whole run. Both are externally triggered; there is no timeout-based
//! cancellation anywhere in the engine.
//!
//! The [`AbortController`] is held by whoever may trigger aborts (the worker,
//! the signal handler, tests). Each plugin run gets a fresh [`AbortToken`];
//! the command runner awaits the token while streaming child output.

use std::sync::Arc;
use tokio::sync::watch;

/// Scope of an abort request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortKind {
    /// Unwinds the current plugin only; the worker continues with the next one
    Plugin,
    /// Unwinds the entire run loop across all pending plugins and targets
    Framework,
}

/// Shared trigger side of the abort channels
///
/// Cheap to clone; all clones observe and drive the same state. The plugin
/// channel is reset by the worker between plugin invocations, the framework
/// channel latches for the lifetime of the run.
#[derive(Clone)]
pub struct AbortController {
    plugin_tx: Arc<watch::Sender<bool>>,
    framework_tx: Arc<watch::Sender<bool>>,
}

impl AbortController {
    pub fn new() -> Self {
        let (plugin_tx, _) = watch::channel(false);
        let (framework_tx, _) = watch::channel(false);
        Self {
            plugin_tx: Arc::new(plugin_tx),
            framework_tx: Arc::new(framework_tx),
        }
    }

    /// Create a token observing the current abort state
    pub fn token(&self) -> AbortToken {
        AbortToken {
            plugin_rx: self.plugin_tx.subscribe(),
            framework_rx: self.framework_tx.subscribe(),
        }
    }

    /// Request abort of the currently running plugin
    pub fn abort_plugin(&self) {
        let _ = self.plugin_tx.send(true);
    }

    /// Request abort of the entire run
    pub fn abort_framework(&self) {
        let _ = self.framework_tx.send(true);
    }

    /// Clear the plugin-scoped flag; called by the worker between plugins
    pub fn reset_plugin(&self) {
        let _ = self.plugin_tx.send(false);
    }

    pub fn is_framework_aborted(&self) -> bool {
        *self.framework_tx.borrow()
    }

    /// Wire OS termination signals to framework abort
    ///
    /// Ctrl-C and friends map to a framework abort so that every in-flight
    /// plugin unwinds carrying its partial output before the process exits.
    pub fn install_signal_handlers(&self) {
        #[cfg(unix)]
        {
            unsafe {
                libc::signal(libc::SIGPIPE, libc::SIG_DFL);
            }

            use tokio::signal::unix::{signal, SignalKind};
            let signals = [SignalKind::interrupt(), SignalKind::terminate()];

            for kind in signals {
                let controller = self.clone();
                tokio::spawn(async move {
                    if let Ok(mut sig) = signal(kind) {
                        if sig.recv().await.is_some() {
                            log::warn!("Termination signal received, aborting run");
                            controller.abort_framework();
                        }
                    }
                });
            }
        }
    }
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side handed to a single plugin run
pub struct AbortToken {
    plugin_rx: watch::Receiver<bool>,
    framework_rx: watch::Receiver<bool>,
}

impl AbortToken {
    /// Non-blocking check; framework abort wins when both flags are set
    pub fn check(&self) -> Option<AbortKind> {
        if *self.framework_rx.borrow() {
            Some(AbortKind::Framework)
        } else if *self.plugin_rx.borrow() {
            Some(AbortKind::Plugin)
        } else {
            None
        }
    }

    /// Resolve when an abort of either scope fires
    ///
    /// Pends forever if the controller is gone, since no abort can be
    /// requested any more at that point.
    pub async fn triggered(&mut self) -> AbortKind {
        loop {
            if let Some(kind) = self.check() {
                return kind;
            }
            let framework_closed;
            let plugin_closed;
            tokio::select! {
                res = self.framework_rx.changed() => {
                    framework_closed = res.is_err();
                    plugin_closed = false;
                }
                res = self.plugin_rx.changed() => {
                    plugin_closed = res.is_err();
                    framework_closed = false;
                }
            }
            if framework_closed || plugin_closed {
                std::future::pending::<()>().await;
            }
        }
    }
}
