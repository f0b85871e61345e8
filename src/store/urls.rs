//! URL store seam

use std::collections::HashSet;
use std::sync::Mutex;

/// Narrow interface over the persistent URL store
pub trait UrlStore: Send + Sync {
    /// Import URLs, ignoring ones already present; returns how many were new.
    /// Import order of first appearance is preserved.
    fn import_urls(&self, urls: &[String]) -> usize;

    fn all(&self) -> Vec<String>;

    /// Re-establish the backing connection; workers call this on start.
    /// In-memory stores have nothing to do.
    fn reconnect(&self) {}
}

/// Order-preserving, de-duplicating in-memory store
#[derive(Debug, Default)]
pub struct MemoryUrlStore {
    inner: Mutex<(Vec<String>, HashSet<String>)>,
}

impl MemoryUrlStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UrlStore for MemoryUrlStore {
    fn import_urls(&self, urls: &[String]) -> usize {
        let mut inner = self.inner.lock().expect("url store poisoned");
        let (ordered, seen) = &mut *inner;
        let mut added = 0;
        for url in urls {
            if seen.insert(url.clone()) {
                ordered.push(url.clone());
                added += 1;
            }
        }
        added
    }

    fn all(&self) -> Vec<String> {
        self.inner.lock().expect("url store poisoned").0.clone()
    }
}
