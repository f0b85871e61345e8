//! End-to-end plugin execution flow
//!
//! Drives declarations through registry, worker, command runner and report
//! sink together, the way a real run composes them.

use probekit::config::Settings;
use probekit::core::abort::{AbortController, AbortKind};
use probekit::envelope::kind;
use probekit::plugin::{PluginContext, PluginGroup, PluginRegistry};
use probekit::resource::{Resource, ResourceStore};
use probekit::store::{MemoryReportSink, MemoryUrlStore, UrlStore};
use probekit::worker::{PluginWorker, WorkerConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn web_batch(registry: &PluginRegistry) -> Vec<probekit::plugin::PluginDecl> {
    registry
        .select(PluginGroup::Web, None, &[], &[])
        .into_iter()
        .cloned()
        .collect()
}

#[tokio::test]
async fn full_run_produces_dumps_and_report_entries() {
    let tmp = tempfile::tempdir().unwrap();

    let settings = {
        let mut s = Settings::default();
        s.output.web = tmp.path().to_path_buf();
        s.for_target("http://x.test")
    };

    let mut resources = ResourceStore::new();
    resources.register("scan", Resource::new("Target scan", "echo scanned {TARGET}"));

    let registry = Arc::new(
        PluginRegistry::from_toml(
            r#"
            [[plugins]]
            code = "PK-001"
            group = "web"
            kind = "active"
            title = "Web Scanners"
            resource = { name = "scan" }

            [[plugins]]
            code = "PK-002"
            group = "web"
            kind = "external"
            title = "Manual Review"
            description = "Review the captured output by hand"
            "#,
            Path::new("plugins.toml"),
        )
        .unwrap(),
    );

    let ctx = PluginContext::new(Arc::new(settings), Arc::new(resources));
    let sink = Arc::new(MemoryReportSink::new());
    let (worker, _control) = PluginWorker::new(
        WorkerConfig::default(),
        ctx,
        registry.clone(),
        sink.clone(),
        AbortController::new(),
    );

    let summary = worker.run(web_batch(&registry)).await;
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.failed, 0);
    assert!(!summary.framework_aborted);

    let entries = sink.entries();
    assert_eq!(entries.len(), 2);

    // The target token was substituted and the dump landed under the
    // target-scoped output root
    let dump = &entries[0].envelopes[0];
    assert_eq!(dump.kind, kind::COMMAND_DUMP);
    assert_eq!(dump.output["ModifiedCommand"], "echo scanned http://x.test");
    assert_eq!(
        dump.output["RelativeFilePath"],
        "Web_Scanners/active/Target_scan.txt"
    );
    let on_disk = std::fs::read_to_string(
        tmp.path()
            .join("httpx.test/Web_Scanners/active/Target_scan.txt"),
    )
    .unwrap();
    assert_eq!(on_disk, "scanned http://x.test");

    assert_eq!(entries[1].envelopes[0].kind, kind::HTML_STRING);
}

#[tokio::test]
async fn sentinel_resource_feeds_the_url_store() {
    let tmp = tempfile::tempdir().unwrap();
    let mut settings = Settings::default();
    settings.output.web = tmp.path().to_path_buf();

    let mut resources = ResourceStore::new();
    resources.register(
        "harvest",
        Resource::new("Extract URLs", "printf 'http://a.test\\nhttp://a.test\\nhttp://b.test\\n'"),
    );

    let registry = Arc::new(
        PluginRegistry::from_toml(
            r#"
            [[plugins]]
            code = "PK-010"
            group = "web"
            kind = "active"
            title = "URL Harvest"
            resource = { name = "harvest" }
            "#,
            Path::new("plugins.toml"),
        )
        .unwrap(),
    );

    let urls = Arc::new(MemoryUrlStore::new());
    let ctx = PluginContext::new(Arc::new(settings), Arc::new(resources))
        .with_urls(urls.clone());
    let sink = Arc::new(MemoryReportSink::new());
    let (worker, _control) = PluginWorker::new(
        WorkerConfig::default(),
        ctx,
        registry.clone(),
        sink.clone(),
        AbortController::new(),
    );

    let summary = worker.run(web_batch(&registry)).await;
    assert_eq!(summary.completed, 1);

    // De-duplicated, order of first appearance
    assert_eq!(urls.all(), vec!["http://a.test", "http://b.test"]);

    let entries = sink.entries();
    let envelope = &entries[0].envelopes[0];
    assert_eq!(envelope.kind, kind::URLS_FROM_STR);
    assert_eq!(envelope.output["Visited"], false);
}

#[tokio::test]
async fn plugin_abort_costs_one_plugin_only() {
    let tmp = tempfile::tempdir().unwrap();
    let mut settings = Settings::default();
    settings.output.web = tmp.path().to_path_buf();

    let mut resources = ResourceStore::new();
    resources.register("slow", Resource::new("Slow probe", "echo begun; sleep 30"));
    resources.register("quick", Resource::new("Quick probe", "echo done"));

    let registry = Arc::new(
        PluginRegistry::from_toml(
            r#"
            [[plugins]]
            code = "PK-020"
            group = "web"
            kind = "active"
            title = "Interrupted"
            resource = { name = "slow" }

            [[plugins]]
            code = "PK-021"
            group = "web"
            kind = "active"
            title = "Still Runs"
            resource = { name = "quick" }
            "#,
            Path::new("plugins.toml"),
        )
        .unwrap(),
    );

    let ctx = PluginContext::new(Arc::new(settings), Arc::new(resources));
    let sink = Arc::new(MemoryReportSink::new());
    let abort = AbortController::new();
    let (worker, _control) = PluginWorker::new(
        WorkerConfig::default(),
        ctx,
        registry.clone(),
        sink.clone(),
        abort.clone(),
    );

    let aborter = abort.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        aborter.abort_plugin();
    });

    let summary = worker.run(web_batch(&registry)).await;
    assert_eq!(summary.aborted, 1);
    assert_eq!(summary.completed, 1);
    assert!(!summary.framework_aborted);

    let entries = sink.entries();
    assert_eq!(entries.len(), 2);
    // The interrupted plugin still delivered its partial capture
    assert_eq!(entries[0].plugin_code, "PK-020");
    assert_eq!(entries[0].envelopes[0].output["RawOutput"], "begun");
    assert_eq!(entries[1].plugin_code, "PK-021");
    assert_eq!(entries[1].envelopes[0].output["RawOutput"], "done");
}

#[tokio::test]
async fn stop_request_mid_run_skips_the_rest() {
    let tmp = tempfile::tempdir().unwrap();
    let mut settings = Settings::default();
    settings.output.web = tmp.path().to_path_buf();

    let mut resources = ResourceStore::new();
    resources.register("slow", Resource::new("Slow probe", "echo begun; sleep 30"));

    let registry = Arc::new(
        PluginRegistry::from_toml(
            r#"
            [[plugins]]
            code = "PK-030"
            group = "web"
            kind = "active"
            title = "First"
            resource = { name = "slow" }

            [[plugins]]
            code = "PK-031"
            group = "web"
            kind = "external"
            title = "Pending"
            "#,
            Path::new("plugins.toml"),
        )
        .unwrap(),
    );

    let ctx = PluginContext::new(Arc::new(settings), Arc::new(resources));
    let sink = Arc::new(MemoryReportSink::new());
    let abort = AbortController::new();
    let (worker, control) = PluginWorker::new(
        WorkerConfig::default(),
        ctx,
        registry.clone(),
        sink.clone(),
        abort.clone(),
    );

    // A stop request alone does not interrupt the running command, so pair
    // it with a framework abort the way a signal handler would
    let aborter = abort.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        control.stop();
        aborter.abort_framework();
    });

    let summary = worker.run(web_batch(&registry)).await;
    assert!(summary.framework_aborted);
    assert_eq!(summary.completed, 0);
    assert_eq!(summary.skipped, 1);

    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].plugin_code, "PK-030");
}

#[tokio::test]
async fn run_outcome_abort_kinds_match_scope() {
    // The same command aborted at plugin scope and framework scope produces
    // differently scoped outcomes with identical partial envelopes
    for (framework, expected) in [(false, AbortKind::Plugin), (true, AbortKind::Framework)] {
        let tmp = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.output.web = tmp.path().to_path_buf();

        let mut resources = ResourceStore::new();
        resources.register("slow", Resource::new("Probe", "echo partial; sleep 30"));

        let registry = Arc::new(
            PluginRegistry::from_toml(
                r#"
                [[plugins]]
                code = "PK-040"
                group = "web"
                kind = "active"
                title = "Scoped"
                resource = { name = "slow" }
                "#,
                Path::new("plugins.toml"),
            )
            .unwrap(),
        );

        let ctx = PluginContext::new(Arc::new(settings), Arc::new(resources));
        let abort = AbortController::new();
        let mut plugin = registry
            .instantiate(registry.all().first().unwrap(), ctx)
            .unwrap();
        let mut token = abort.token();

        let aborter = abort.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            if framework {
                aborter.abort_framework();
            } else {
                aborter.abort_plugin();
            }
        });

        let outcome = plugin.run(&mut token).await.unwrap();
        assert_eq!(outcome.aborted_kind(), Some(expected));
        assert_eq!(outcome.envelopes()[0].output["RawOutput"], "partial");
    }
}
