//! Grep behavior: pattern search over already-captured transactions
//!
//! Grep plugins generate no traffic at all. Each named pattern from the
//! settings is compiled and run over the transaction store's response
//! headers or bodies, one match envelope per pattern.

use crate::config::GrepPart;
use crate::envelope::{Envelope, RunOutcome};
use crate::plugin::{PluginError, PluginResult, PluginRuntime};
use regex::Regex;

#[derive(Debug, Clone, Default)]
pub struct GrepBehavior {
    /// Pattern names to apply; empty means the configured defaults
    pub pattern_names: Vec<String>,
}

impl GrepBehavior {
    pub fn run(&self, runtime: &mut PluginRuntime) -> PluginResult<RunOutcome> {
        let settings = runtime.ctx().settings.clone();
        let names: &[String] = if self.pattern_names.is_empty() {
            &settings.grep.default_patterns
        } else {
            &self.pattern_names
        };

        let mut envelopes = Vec::with_capacity(names.len());
        for name in names {
            let spec = settings.grep.patterns.get(name).ok_or_else(|| {
                PluginError::UnknownPattern {
                    code: runtime.info().code.clone(),
                    pattern_name: name.clone(),
                }
            })?;
            let regex = Regex::new(&spec.pattern).map_err(|e| PluginError::BadPattern {
                code: runtime.info().code.clone(),
                pattern_name: name.clone(),
                message: e.to_string(),
            })?;

            let (header_not_body, matches) = match spec.part {
                GrepPart::Header => (true, runtime.ctx().transactions.header_matches(&regex)),
                GrepPart::Body => (false, runtime.ctx().transactions.body_matches(&regex)),
            };
            log::debug!("Pattern '{}' matched {} transaction(s)", name, matches.len());
            envelopes.push(Envelope::response_matches(
                header_not_body,
                name,
                &spec.pattern,
                &matches,
            ));
        }

        if envelopes.is_empty() {
            envelopes.push(Envelope::html_string(&runtime.info().description));
        }
        Ok(RunOutcome::Completed(envelopes))
    }
}
