//! Report delivery seam

use crate::envelope::Envelope;
use std::sync::Mutex;

/// Where finished (or partially finished) envelope sequences go
///
/// Envelope records are handed off by value; the core keeps no reference
/// to them after delivery.
#[async_trait::async_trait]
pub trait ReportSink: Send + Sync {
    async fn deliver(&self, plugin_code: &str, envelopes: Vec<Envelope>);
}

/// One delivered batch
#[derive(Debug, Clone)]
pub struct ReportEntry {
    pub plugin_code: String,
    pub delivered_at: chrono::DateTime<chrono::Utc>,
    pub envelopes: Vec<Envelope>,
}

/// Collecting sink for single-process runs and tests
#[derive(Debug, Default)]
pub struct MemoryReportSink {
    entries: Mutex<Vec<ReportEntry>>,
}

impl MemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<ReportEntry> {
        self.entries.lock().expect("report sink poisoned").clone()
    }
}

#[async_trait::async_trait]
impl ReportSink for MemoryReportSink {
    async fn deliver(&self, plugin_code: &str, envelopes: Vec<Envelope>) {
        log::debug!(
            "Report delivery from '{}': {} envelope(s)",
            plugin_code,
            envelopes.len()
        );
        self.entries.lock().expect("report sink poisoned").push(ReportEntry {
            plugin_code: plugin_code.to_string(),
            delivered_at: chrono::Utc::now(),
            envelopes,
        });
    }
}
