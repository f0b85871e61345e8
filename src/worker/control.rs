//! Worker control queue
//!
//! A FIFO channel carrying cooperative shutdown requests. The worker polls
//! it between plugin invocations, never during one; a command in flight is
//! interrupted through the abort channels instead.

use tokio::sync::mpsc;

/// Control messages a worker owner can enqueue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    /// Finish nothing further: skip all remaining plugins and return
    Stop,
}

/// Sender half held by whoever owns the worker
#[derive(Clone)]
pub struct ControlHandle {
    tx: mpsc::UnboundedSender<ControlSignal>,
}

impl ControlHandle {
    /// Enqueue a stop request; returns false if the worker is gone
    pub fn stop(&self) -> bool {
        self.tx.send(ControlSignal::Stop).is_ok()
    }
}

/// Receiver half polled by the worker between plugins
pub struct ControlQueue {
    rx: mpsc::UnboundedReceiver<ControlSignal>,
}

impl ControlQueue {
    /// Drain pending signals without blocking; true if any was a stop
    pub fn stop_requested(&mut self) -> bool {
        let mut stop = false;
        while let Ok(signal) = self.rx.try_recv() {
            match signal {
                ControlSignal::Stop => stop = true,
            }
        }
        stop
    }
}

pub fn control_channel() -> (ControlHandle, ControlQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ControlHandle { tx }, ControlQueue { rx })
}
