//! Active behavior: run external commands against the target
//!
//! Executes every resolved resource in declaration order through the command
//! runner, producing one envelope per command. A resource whose display name
//! matches the configured extraction sentinel is treated as a URL harvest
//! instead of a plain dump. The command loop is shared with the semi-passive
//! variant, which runs it before its transaction operations.

use crate::command::CommandRunner;
use crate::command::ExecutionResult;
use crate::core::abort::AbortToken;
use crate::envelope::{Envelope, RunOutcome};
use crate::plugin::{PluginResult, PluginRuntime};

pub struct ActiveBehavior {
    /// Dereference harvested URLs so their transactions get captured
    pub visit_imported_urls: bool,
}

impl ActiveBehavior {
    pub async fn run(
        &self,
        runtime: &mut PluginRuntime,
        token: &mut AbortToken,
    ) -> PluginResult<RunOutcome> {
        run_commands(runtime, token, self.visit_imported_urls).await
    }
}

/// Execute each resolved resource in order, first abort wins
///
/// An abort during a command still yields an envelope for that command,
/// built from the partial capture, before the remaining resources are
/// dropped.
pub(crate) async fn run_commands(
    runtime: &mut PluginRuntime,
    token: &mut AbortToken,
    visit_imported_urls: bool,
) -> PluginResult<RunOutcome> {
    let runner = CommandRunner::new(runtime.ctx().settings.clone());
    let resources = runtime.resolved_resources()?;
    let output_dir = runtime.output_dir()?.to_path_buf();

    let mut envelopes = Vec::new();
    for resource in resources {
        let result = runner
            .execute(&resource.command_template, &output_dir, token)
            .await?;
        let aborted = result.aborted_by.abort_kind();

        let envelope = if resource.display_name == runtime.ctx().settings.extract_urls_sentinel {
            harvest_urls(runtime, &result, visit_imported_urls).await
        } else {
            let relative = runtime.dump_raw_output(&resource.display_name, &result.raw_output)?;
            Envelope::command_dump(&result, &relative)
        };
        envelopes.push(envelope);

        if let Some(kind) = aborted {
            return Ok(RunOutcome::Aborted {
                kind,
                partial: envelopes,
            });
        }
    }

    // A run always reports something, even with nothing to execute
    if envelopes.is_empty() {
        envelopes.push(Envelope::html_string(&runtime.info().description));
    }
    Ok(RunOutcome::Completed(envelopes))
}

/// Treat the command output as one URL per line and feed the URL store
async fn harvest_urls(
    runtime: &PluginRuntime,
    result: &ExecutionResult,
    visit: bool,
) -> Envelope {
    let urls: Vec<String> = result
        .raw_output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();
    let added = runtime.ctx().urls.import_urls(&urls);
    log::debug!("Imported {} new URL(s) of {} harvested", added, urls.len());

    if visit {
        for url in &urls {
            runtime.ctx().visitor.visit(url).await;
        }
    }
    Envelope::urls_from_str(result, &urls, visit)
}
