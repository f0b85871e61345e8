//! Passive behavior: link lists from third-party sources, no target traffic
//!
//! Passive plugins never touch the target. Their resource spec names groups
//! of search/lookup URLs, rendered as (possibly tabbed) link lists for the
//! analyst to follow by hand, optionally accompanied by a box of suggested
//! commands to copy out.

use crate::envelope::{Envelope, RunOutcome};
use crate::plugin::{PluginResult, PluginRuntime};
use crate::resource::ResourceSpec;

/// A header plus (category name, resource text) rows rendered as one box
#[derive(Debug, Clone)]
pub struct SuggestedCommands {
    pub header: String,
    pub categories: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default)]
pub struct PassiveBehavior {
    pub suggested_commands: Option<SuggestedCommands>,
}

impl PassiveBehavior {
    pub fn run(&self, runtime: &mut PluginRuntime) -> PluginResult<RunOutcome> {
        let mut envelopes = Vec::new();

        match runtime.resource_spec().cloned() {
            // Tab structure is preserved, one link list per tab
            Some(ResourceSpec::Tabs(tabs)) => {
                let mut resolved = Vec::with_capacity(tabs.len());
                for (tab_name, group_name) in tabs {
                    let links = runtime.ctx().resources.resolve(&group_name)?;
                    resolved.push((tab_name, links));
                }
                envelopes.push(Envelope::tabbed_resource_link_list(&resolved));
            }
            Some(ResourceSpec::Name(name)) => {
                let links = runtime.ctx().resources.resolve(&name)?;
                envelopes.push(Envelope::resource_link_list(&name, &links));
            }
            Some(ResourceSpec::Names(names)) => {
                let links = runtime.ctx().resources.resolve_all(&names)?;
                envelopes.push(Envelope::resource_link_list(&runtime.info().title, &links));
            }
            None => {}
        }

        if let Some(suggested) = &self.suggested_commands {
            envelopes.push(Envelope::suggested_command_box(
                &suggested.header,
                &suggested.categories,
            ));
        }

        // A plugin run always reports something, even a bare description
        if envelopes.is_empty() {
            envelopes.push(Envelope::html_string(&runtime.info().description));
        }
        Ok(RunOutcome::Completed(envelopes))
    }
}
