//! Transaction store seam
//!
//! Semi-passive and grep plugins operate over already-captured network
//! transactions instead of issuing their own traffic. The store interface
//! covers the three operations they need: lookup by id, cache-respecting
//! fetch assurance, and header/body pattern search.

use regex::Regex;
use std::collections::HashSet;
use std::sync::Mutex;

/// One captured request/response pair
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transaction {
    pub id: u64,
    pub url: String,
    pub method: String,
    pub status: u16,
    pub response_headers: String,
    pub response_body: String,
}

/// Narrow interface over the transaction capture store
pub trait TransactionStore: Send + Sync {
    fn transactions_by_id(&self, ids: &[u64]) -> Vec<Transaction>;

    /// Ensure each URL type has been fetched at least once with the given
    /// method. With `use_cache` a previous fetch satisfies the request;
    /// without it every type is fetched again. Returns the number of fetches
    /// actually performed.
    fn ensure_fetched(
        &self,
        url_types: &[String],
        use_cache: bool,
        method: &str,
        data: Option<&str>,
    ) -> usize;

    /// Search response headers; returns `(transaction id, matched text)` pairs
    fn header_matches(&self, pattern: &Regex) -> Vec<(u64, String)>;

    /// Search response bodies; returns `(transaction id, matched text)` pairs
    fn body_matches(&self, pattern: &Regex) -> Vec<(u64, String)>;

    /// Re-establish the backing connection; workers call this on start.
    fn reconnect(&self) {}
}

#[derive(Debug, Default)]
pub struct MemoryTransactionStore {
    transactions: Mutex<Vec<Transaction>>,
    fetched: Mutex<HashSet<(String, String)>>,
}

impl MemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, transaction: Transaction) {
        self.transactions
            .lock()
            .expect("transaction store poisoned")
            .push(transaction);
    }
}

impl TransactionStore for MemoryTransactionStore {
    fn transactions_by_id(&self, ids: &[u64]) -> Vec<Transaction> {
        let transactions = self.transactions.lock().expect("transaction store poisoned");
        ids.iter()
            .filter_map(|id| transactions.iter().find(|t| t.id == *id).cloned())
            .collect()
    }

    fn ensure_fetched(
        &self,
        url_types: &[String],
        use_cache: bool,
        method: &str,
        _data: Option<&str>,
    ) -> usize {
        let mut fetched = self.fetched.lock().expect("transaction store poisoned");
        let mut performed = 0;
        for url_type in url_types {
            let key = (url_type.clone(), method.to_string());
            if use_cache && fetched.contains(&key) {
                continue;
            }
            fetched.insert(key);
            performed += 1;
        }
        performed
    }

    fn header_matches(&self, pattern: &Regex) -> Vec<(u64, String)> {
        let transactions = self.transactions.lock().expect("transaction store poisoned");
        transactions
            .iter()
            .filter_map(|t| {
                pattern
                    .find(&t.response_headers)
                    .map(|m| (t.id, m.as_str().to_string()))
            })
            .collect()
    }

    fn body_matches(&self, pattern: &Regex) -> Vec<(u64, String)> {
        let transactions = self.transactions.lock().expect("transaction store poisoned");
        transactions
            .iter()
            .filter_map(|t| {
                pattern
                    .find(&t.response_body)
                    .map(|m| (t.id, m.as_str().to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> MemoryTransactionStore {
        let store = MemoryTransactionStore::new();
        store.record(Transaction {
            id: 1,
            url: "http://x.test/".to_string(),
            method: "GET".to_string(),
            status: 200,
            response_headers: "Server: nginx\r\nSet-Cookie: sid=1".to_string(),
            response_body: "<html>admin panel</html>".to_string(),
        });
        store.record(Transaction {
            id: 2,
            url: "http://x.test/about".to_string(),
            method: "GET".to_string(),
            status: 404,
            response_headers: "Server: nginx".to_string(),
            response_body: "not found".to_string(),
        });
        store
    }

    #[test]
    fn test_lookup_by_id_keeps_requested_order() {
        let store = seeded();
        let found = store.transactions_by_id(&[2, 1, 99]);
        let ids: Vec<_> = found.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_header_matches() {
        let store = seeded();
        let pattern = Regex::new(r"(?i)set-cookie: \S+").unwrap();
        let matches = store.header_matches(&pattern);
        assert_eq!(matches, vec![(1, "Set-Cookie: sid=1".to_string())]);
    }

    #[test]
    fn test_ensure_fetched_respects_cache_flag() {
        let store = seeded();
        let types = vec!["target url".to_string(), "top url".to_string()];

        assert_eq!(store.ensure_fetched(&types, true, "GET", None), 2);
        assert_eq!(store.ensure_fetched(&types, true, "GET", None), 0);
        // use_cache = false forces a refetch
        assert_eq!(store.ensure_fetched(&types, false, "GET", None), 2);
        // A different method is a different fetch
        assert_eq!(store.ensure_fetched(&types, true, "POST", None), 2);
    }
}
