//! Application startup and run orchestration
//!
//! Wires the pieces together: parse arguments, initialise logging, load
//! settings, resources and plugin declarations, then drive one worker per
//! target over the selected plugins. Exit codes: 0 on success, 1 on a
//! configuration error, 2 when the run was aborted framework-wide.

use crate::app::cli::Args;
use crate::app::error::{AppError, AppResult};
use crate::command::CommandRunner;
use crate::config::Settings;
use crate::core::abort::AbortController;
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::plugin::types::PluginGroup;
use crate::plugin::{PluginContext, PluginDecl, PluginRegistry};
use crate::resource::ResourceStore;
use crate::store::{HttpUrlVisitor, MemoryReportSink};
use crate::worker::{PluginWorker, WorkerConfig};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

/// Parse arguments, run, and translate the outcome into an exit code
pub async fn run() -> i32 {
    let args = Args::parse();

    let color_enabled = !args.no_color;
    let log_file = args.log_file.as_ref().map(|p| p.to_string_lossy().into_owned());
    if let Err(e) = init_logging(args.log_level.as_deref(), log_file.as_deref(), color_enabled) {
        eprintln!("Could not initialise logging: {}", e);
        return 1;
    }
    log::info!("probekit {} starting", env!("CARGO_PKG_VERSION"));

    match run_with_args(args).await {
        Ok(framework_aborted) => {
            if framework_aborted {
                2
            } else {
                0
            }
        }
        Err(e) => {
            log_error_with_context(&e, "Run could not be completed");
            1
        }
    }
}

/// Default location for a config file, if one is installed
fn installed_file(name: &str) -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("probekit").join(name);
    path.is_file().then_some(path)
}

fn load_settings(args: &Args) -> AppResult<Settings> {
    match args.config.clone().or_else(|| installed_file("settings.toml")) {
        Some(path) => {
            log::debug!("Loading settings from {}", path.display());
            Ok(Settings::load(&path)?)
        }
        None => Ok(Settings::default()),
    }
}

fn load_resources(args: &Args) -> AppResult<ResourceStore> {
    match args.resources.clone().or_else(|| installed_file("resources.toml")) {
        Some(path) => {
            log::debug!("Loading resources from {}", path.display());
            Ok(ResourceStore::load(&path)?)
        }
        None => Ok(ResourceStore::new()),
    }
}

fn load_registry(args: &Args) -> AppResult<PluginRegistry> {
    match args.plugins.clone().or_else(|| installed_file("plugins.toml")) {
        Some(path) => {
            log::debug!("Loading plugin declarations from {}", path.display());
            Ok(PluginRegistry::load(&path)?)
        }
        None => Ok(PluginRegistry::default()),
    }
}

async fn run_with_args(args: Args) -> AppResult<bool> {
    let plan = args.plan()?;
    let settings = load_settings(&args)?;
    let resources = Arc::new(load_resources(&args)?);
    let registry = Arc::new(load_registry(&args)?);

    let selected: Vec<PluginDecl> = registry
        .select(plan.group, None, &args.only, &args.except)
        .into_iter()
        .filter(|decl| {
            decl.info()
                .validate()
                .map(|(_, kind)| plan.kinds.allows(kind))
                .unwrap_or(true) // invalid decls surface as errors later, not silently
        })
        .cloned()
        .collect();

    if args.list_plugins {
        list_plugins(plan.group, &selected);
        return Ok(false);
    }
    if selected.is_empty() {
        log::warn!("No plugins match the given filters");
        return Ok(false);
    }

    let abort = AbortController::new();
    abort.install_signal_handlers();
    let sink = Arc::new(MemoryReportSink::new());

    let mut framework_aborted = false;
    for (index, target) in plan.targets.iter().enumerate() {
        if abort.is_framework_aborted() {
            log::warn!("Skipping remaining target(s) after framework abort");
            break;
        }
        log::info!("Target {}/{}: {}", index + 1, plan.targets.len(), target);

        let mut target_settings = settings.for_target(target);
        for (key, value) in &plan.aux_tokens {
            target_settings.tokens.insert(key.clone(), value.clone());
        }
        let target_settings = Arc::new(target_settings);

        let batch = if args.force_overwrite {
            selected.clone()
        } else {
            skip_already_run(&target_settings, &selected)
        };

        if args.simulation {
            simulate(&target_settings, &resources, &batch)?;
            continue;
        }

        let ctx = PluginContext::new(target_settings, resources.clone())
            .with_visitor(Arc::new(HttpUrlVisitor::new()));
        let (worker, _control) = PluginWorker::new(
            WorkerConfig {
                worker_id: index,
                log_level: None,
            },
            ctx,
            registry.clone(),
            sink.clone(),
            abort.clone(),
        );

        let summary = worker.run(batch).await;
        framework_aborted = framework_aborted || summary.framework_aborted;
    }

    if !args.simulation {
        write_report(&settings, plan.group, &sink)?;
    }
    Ok(framework_aborted)
}

/// Drop plugins whose output directory already holds files
fn skip_already_run(settings: &Settings, selected: &[PluginDecl]) -> Vec<PluginDecl> {
    selected
        .iter()
        .filter(|decl| {
            let Ok((group, kind)) = decl.info().validate() else {
                return true;
            };
            let dir = settings
                .output
                .for_group(group)
                .join(crate::core::strings::sanitize_for_path(&decl.title))
                .join(kind.to_string());
            let has_output = std::fs::read_dir(&dir)
                .map(|mut entries| entries.next().is_some())
                .unwrap_or(false);
            if has_output {
                log::info!(
                    "Skipping '{}': output already present in {} (use --force-overwrite to re-run)",
                    decl.code,
                    dir.display()
                );
            }
            !has_output
        })
        .cloned()
        .collect()
}

fn list_plugins(group: PluginGroup, selected: &[PluginDecl]) {
    println!("{} plugin(s) in group '{}':", selected.len(), group);
    for decl in selected {
        println!("  {:<10} {:<14} {}", decl.code, decl.kind, decl.title);
    }
}

/// Print every substituted command the run would execute
fn simulate(
    settings: &Arc<Settings>,
    resources: &Arc<ResourceStore>,
    batch: &[PluginDecl],
) -> AppResult<()> {
    let runner = CommandRunner::new(settings.clone());
    for decl in batch {
        let Some(spec) = &decl.resource else { continue };
        let Ok((group, kind)) = decl.info().validate() else {
            continue;
        };
        let output_dir = settings
            .output
            .for_group(group)
            .join(crate::core::strings::sanitize_for_path(&decl.title))
            .join(kind.to_string());
        println!("# {} ({})", decl.title, decl.code);
        for resource in spec.resolve(resources)? {
            println!("{}", runner.substitute(&resource.command_template, &output_dir));
        }
    }
    Ok(())
}

/// Persist the collected envelope batches as one JSON report per run
fn write_report(
    settings: &Settings,
    group: PluginGroup,
    sink: &MemoryReportSink,
) -> AppResult<()> {
    let entries = sink.entries();
    if entries.is_empty() {
        return Ok(());
    }
    let report: Vec<serde_json::Value> = entries
        .iter()
        .map(|entry| {
            serde_json::json!({
                "PluginCode": entry.plugin_code,
                "DeliveredAt": entry.delivered_at.to_rfc3339(),
                "Envelopes": entry.envelopes,
            })
        })
        .collect();

    let root = settings.output.for_group(group);
    let path = root.join("report.json");
    std::fs::create_dir_all(root).map_err(|source| AppError::Report {
        path: path.clone(),
        source,
    })?;
    let raw = serde_json::to_string_pretty(&report).unwrap_or_else(|_| "[]".to_string());
    std::fs::write(&path, raw).map_err(|source| AppError::Report {
        path: path.clone(),
        source,
    })?;
    log::info!("Report written to {}", path.display());
    Ok(())
}
