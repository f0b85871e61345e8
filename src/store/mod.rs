//! External collaborator seams
//!
//! Persistence, transaction capture, HTTP fetching and report delivery are
//! external collaborators of the plugin execution core. This module defines
//! the narrow traits the core programs against, plus in-memory defaults
//! good enough for single-process runs and tests.

mod http;
mod report;
mod transactions;
mod urls;

pub use http::{HttpUrlVisitor, NullVisitor, UrlVisitor};
#[cfg(test)]
pub use http::test_support::RecordingVisitor;
pub use report::{MemoryReportSink, ReportEntry, ReportSink};
pub use transactions::{MemoryTransactionStore, Transaction, TransactionStore};
pub use urls::{MemoryUrlStore, UrlStore};
