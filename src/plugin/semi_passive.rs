//! Semi-passive behavior: normal-traffic probes over the transaction store
//!
//! Semi-passive plugins may issue traffic indistinguishable from a regular
//! visitor. They reuse the active command loop for their probes, then report
//! over the transaction capture store: tables referencing transactions by id,
//! and fetch assurances for whole URL categories.

use crate::core::abort::AbortToken;
use crate::envelope::{Envelope, RunOutcome};
use crate::plugin::active::run_commands;
use crate::plugin::{PluginResult, PluginRuntime};

/// Parameters for a category-wide fetch assurance
#[derive(Debug, Clone)]
pub struct UrlListRequest {
    /// Symbolic URL categories, e.g. "target url", "top url"
    pub url_types: Vec<String>,
    /// When set, a previously captured fetch satisfies the request
    pub use_cache: bool,
    pub method: String,
    pub data: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SemiPassiveBehavior {
    /// Already-captured transactions this plugin reports on
    pub transaction_ids: Vec<u64>,
    pub url_list_request: Option<UrlListRequest>,
}

impl SemiPassiveBehavior {
    pub async fn run(
        &self,
        runtime: &mut PluginRuntime,
        token: &mut AbortToken,
    ) -> PluginResult<RunOutcome> {
        let mut envelopes = match run_commands(runtime, token, false).await? {
            RunOutcome::Completed(envelopes) => envelopes,
            // Transaction reporting is skipped once the run is unwinding
            aborted @ RunOutcome::Aborted { .. } => return Ok(aborted),
        };

        if !self.transaction_ids.is_empty() {
            envelopes.push(self.transaction_table(runtime));
        }
        if let Some(request) = &self.url_list_request {
            envelopes.push(self.transaction_table_for_url_list(runtime, request));
        }

        if envelopes.is_empty() {
            envelopes.push(Envelope::html_string(&runtime.info().description));
        }
        Ok(RunOutcome::Completed(envelopes))
    }

    /// Reference the declared transactions that actually exist in the store
    ///
    /// The envelope carries ids only; bodies stay in the store for the
    /// reporter to fetch lazily. Declared ids with no captured transaction
    /// are dropped with a debug note.
    fn transaction_table(&self, runtime: &PluginRuntime) -> Envelope {
        let found = runtime
            .ctx()
            .transactions
            .transactions_by_id(&self.transaction_ids);
        if found.len() < self.transaction_ids.len() {
            log::debug!(
                "{} of {} declared transaction id(s) not captured",
                self.transaction_ids.len() - found.len(),
                self.transaction_ids.len()
            );
        }
        let ids: Vec<u64> = found.iter().map(|t| t.id).collect();
        Envelope::transaction_table_from_ids(&ids)
    }

    /// Ensure each URL category has been fetched, then describe the request
    fn transaction_table_for_url_list(
        &self,
        runtime: &PluginRuntime,
        request: &UrlListRequest,
    ) -> Envelope {
        let performed = runtime.ctx().transactions.ensure_fetched(
            &request.url_types,
            request.use_cache,
            &request.method,
            request.data.as_deref(),
        );
        log::debug!(
            "Fetch assurance over {:?}: {} fetch(es) performed",
            request.url_types,
            performed
        );
        Envelope::transaction_table_for_url_list(
            &request.url_types,
            request.use_cache,
            &request.method,
            request.data.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::core::abort::AbortController;
    use crate::envelope::kind;
    use crate::plugin::types::{PluginGroup, PluginKind};
    use crate::plugin::{PluginContext, PluginInfo, ResourceAcquisition};
    use crate::resource::{Resource, ResourceSpec, ResourceStore};
    use crate::store::{MemoryTransactionStore, Transaction};
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    fn info() -> PluginInfo {
        PluginInfo {
            group: PluginGroup::Web.to_string(),
            kind: PluginKind::SemiPassive.to_string(),
            title: "Spidering".to_string(),
            code: "PK-903".to_string(),
            file_path: PathBuf::from("plugins/spider.toml"),
            description: "Semi-passive probing".to_string(),
        }
    }

    fn seeded_transactions() -> Arc<MemoryTransactionStore> {
        let store = MemoryTransactionStore::new();
        store.record(Transaction {
            id: 7,
            url: "http://x.test/".to_string(),
            method: "GET".to_string(),
            status: 200,
            response_headers: "Server: nginx".to_string(),
            response_body: "<html></html>".to_string(),
        });
        Arc::new(store)
    }

    fn runtime(
        root: &Path,
        transactions: Arc<MemoryTransactionStore>,
        acquisition: ResourceAcquisition,
    ) -> PluginRuntime {
        let mut settings = Settings::default();
        settings.output.web = root.to_path_buf();
        let mut resources = ResourceStore::new();
        resources.register("probe", Resource::new("Probe", "echo probed"));
        let ctx = PluginContext::new(Arc::new(settings), Arc::new(resources))
            .with_transactions(transactions);
        PluginRuntime::new(ctx, info(), acquisition).unwrap()
    }

    #[tokio::test]
    async fn test_commands_then_transaction_table() {
        let tmp = tempfile::tempdir().unwrap();
        let mut runtime = runtime(
            tmp.path(),
            seeded_transactions(),
            ResourceAcquisition::Eager(ResourceSpec::Name("probe".to_string())),
        );
        let behavior = SemiPassiveBehavior {
            transaction_ids: vec![7, 99],
            url_list_request: None,
        };
        let mut token = AbortController::new().token();

        let outcome = behavior.run(&mut runtime, &mut token).await.unwrap();
        let envelopes = outcome.envelopes();
        assert_eq!(envelopes.len(), 2);
        assert_eq!(envelopes[0].kind, kind::COMMAND_DUMP);
        assert_eq!(envelopes[1].kind, kind::TRANSACTION_TABLE_FROM_IDS);
        // Uncaptured id 99 is dropped
        assert_eq!(
            envelopes[1].output["TransactionIDs"],
            serde_json::json!([7])
        );
    }

    #[tokio::test]
    async fn test_url_list_request_ensures_fetches() {
        let tmp = tempfile::tempdir().unwrap();
        let transactions = seeded_transactions();
        let mut runtime = runtime(tmp.path(), transactions, ResourceAcquisition::None);
        let behavior = SemiPassiveBehavior {
            transaction_ids: Vec::new(),
            url_list_request: Some(UrlListRequest {
                url_types: vec!["target url".to_string()],
                use_cache: true,
                method: "GET".to_string(),
                data: None,
            }),
        };
        let mut token = AbortController::new().token();

        let outcome = behavior.run(&mut runtime, &mut token).await.unwrap();
        let envelopes = outcome.envelopes();
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].kind, kind::TRANSACTION_TABLE_FOR_URL_LIST);
        assert_eq!(envelopes[0].output["Method"], "GET");
        assert_eq!(envelopes[0].output["UseCache"], true);
    }

    #[tokio::test]
    async fn test_nothing_declared_reports_description() {
        let tmp = tempfile::tempdir().unwrap();
        let mut runtime = runtime(tmp.path(), seeded_transactions(), ResourceAcquisition::None);
        let mut token = AbortController::new().token();

        let outcome = SemiPassiveBehavior::default()
            .run(&mut runtime, &mut token)
            .await
            .unwrap();
        let envelopes = outcome.envelopes();
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].kind, kind::HTML_STRING);
    }
}
