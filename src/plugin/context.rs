//! Plugin execution context
//!
//! Everything a plugin may touch during a run, behind narrow seams. The
//! context replaces the original design's god-object core reference with an
//! explicit, enumerated set of collaborators.

use crate::config::Settings;
use crate::resource::ResourceStore;
use crate::store::{
    MemoryTransactionStore, MemoryUrlStore, NullVisitor, TransactionStore, UrlStore, UrlVisitor,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct PluginContext {
    pub settings: Arc<Settings>,
    pub resources: Arc<ResourceStore>,
    pub urls: Arc<dyn UrlStore>,
    pub transactions: Arc<dyn TransactionStore>,
    pub visitor: Arc<dyn UrlVisitor>,
}

impl PluginContext {
    /// Context over in-memory collaborators; URL dereferencing disabled
    pub fn new(settings: Arc<Settings>, resources: Arc<ResourceStore>) -> Self {
        Self {
            settings,
            resources,
            urls: Arc::new(MemoryUrlStore::new()),
            transactions: Arc::new(MemoryTransactionStore::new()),
            visitor: Arc::new(NullVisitor),
        }
    }

    pub fn with_urls(mut self, urls: Arc<dyn UrlStore>) -> Self {
        self.urls = urls;
        self
    }

    pub fn with_transactions(mut self, transactions: Arc<dyn TransactionStore>) -> Self {
        self.transactions = transactions;
        self
    }

    pub fn with_visitor(mut self, visitor: Arc<dyn UrlVisitor>) -> Self {
        self.visitor = visitor;
        self
    }

    /// Re-establish store connections; workers call this when they start
    pub fn reconnect(&self) {
        self.urls.reconnect();
        self.transactions.reconnect();
    }
}
