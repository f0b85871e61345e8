//! Command-line interface
//!
//! One flat argument set: group and kind select plugins, positional
//! arguments are the targets (or, for the aux group, `KEY=VALUE` parameters
//! handed to the plugins as substitution tokens).

use crate::plugin::types::{PluginGroup, PluginKind};
use clap::Parser;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser, Debug, Clone)]
#[command(name = "probekit")]
#[command(about = "Pluggable security-testing orchestration engine")]
#[command(version)]
pub struct Args {
    /// Targets to assess (URLs for web, hosts for net; KEY=VALUE for aux)
    #[arg(value_name = "TARGETS")]
    pub targets: Vec<String>,

    /// File with one target per line ('#' starts a comment)
    #[arg(short = 'T', long = "target-file", value_name = "FILE")]
    pub target_file: Option<PathBuf>,

    /// Plugin group to run
    #[arg(short = 'g', long = "group", value_name = "GROUP", default_value = "web", value_parser = ["web", "net", "aux"])]
    pub group: String,

    /// Plugin kind to run ('quiet' = passive and semi_passive, web only)
    #[arg(short = 't', long = "type", value_name = "TYPE", default_value = "all", value_parser = ["all", "quiet", "active", "passive", "semi_passive", "grep", "external"])]
    pub plugin_type: String,

    /// Run only these plugin codes*
    #[arg(short = 'o', long = "only", value_name = "CODES", value_delimiter = ',')]
    pub only: Vec<String>,

    /// Skip these plugin codes*
    #[arg(short = 'e', long = "except", value_name = "CODES", value_delimiter = ',')]
    pub except: Vec<String>,

    /// List the plugins the filters select, then exit
    #[arg(short = 'l', long = "list-plugins")]
    pub list_plugins: bool,

    /// Print substituted commands without executing anything
    #[arg(short = 's', long = "simulation")]
    pub simulation: bool,

    /// Re-run plugins whose output directory already has content
    #[arg(short = 'f', long = "force-overwrite")]
    pub force_overwrite: bool,

    /// Settings file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Resource definitions file
    #[arg(short = 'r', long = "resources", value_name = "FILE")]
    pub resources: Option<PathBuf>,

    /// Plugin declarations file
    #[arg(short = 'p', long = "plugins", value_name = "FILE")]
    pub plugins: Option<PathBuf>,

    /// Log level
    #[arg(short = 'L', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log file path
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Disable colored terminal output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Cannot read target file {path}: {source}")]
    TargetFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid target '{target}': targets must not start with '-'")]
    BadTarget { target: String },

    #[error("No targets given; pass them as arguments or via --target-file")]
    NoTargets,

    #[error("Invalid aux parameter '{parameter}': expected KEY=VALUE")]
    BadAuxParameter { parameter: String },

    #[error("Plugin type 'quiet' only applies to the web group")]
    QuietOutsideWeb,
}

impl crate::core::error_handling::ContextualError for CliError {
    fn is_user_actionable(&self) -> bool {
        !matches!(self, CliError::TargetFile { .. })
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

/// Which plugin kinds the `--type` filter admits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindSelection {
    /// Every runnable kind
    All,
    /// Passive and semi-passive only
    Quiet,
    One(PluginKind),
}

impl KindSelection {
    pub fn allows(&self, kind: PluginKind) -> bool {
        match self {
            KindSelection::All => kind != PluginKind::Abstract,
            KindSelection::Quiet => {
                matches!(kind, PluginKind::Passive | PluginKind::SemiPassive)
            }
            KindSelection::One(selected) => kind == *selected,
        }
    }
}

/// Validated run parameters derived from the raw arguments
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub group: PluginGroup,
    pub kinds: KindSelection,
    /// One entry per target; the aux group always has exactly one
    pub targets: Vec<String>,
    /// Substitution tokens parsed from aux KEY=VALUE parameters
    pub aux_tokens: BTreeMap<String, String>,
}

impl Args {
    /// Validate group, kind and target arguments into a run plan
    pub fn plan(&self) -> Result<RunPlan, CliError> {
        // value_parser restricts the strings, so these cannot fail
        let group = PluginGroup::from_str(&self.group).unwrap_or(PluginGroup::Web);
        let kinds = match self.plugin_type.as_str() {
            "all" => KindSelection::All,
            "quiet" => {
                if group != PluginGroup::Web {
                    return Err(CliError::QuietOutsideWeb);
                }
                KindSelection::Quiet
            }
            other => {
                KindSelection::One(PluginKind::from_str(other).unwrap_or(PluginKind::Active))
            }
        };

        if group == PluginGroup::Aux {
            // Aux runs once against a shared scope; positional arguments are
            // plugin parameters, not targets
            let mut aux_tokens = BTreeMap::new();
            for parameter in &self.targets {
                let (key, value) =
                    parameter
                        .split_once('=')
                        .ok_or_else(|| CliError::BadAuxParameter {
                            parameter: parameter.clone(),
                        })?;
                aux_tokens.insert(key.to_string(), value.to_string());
            }
            return Ok(RunPlan {
                group,
                kinds,
                targets: vec!["aux".to_string()],
                aux_tokens,
            });
        }

        let mut targets = self.targets.clone();
        if let Some(path) = &self.target_file {
            targets.extend(load_target_file(path)?);
        }
        for target in &targets {
            if target.starts_with('-') {
                return Err(CliError::BadTarget {
                    target: target.clone(),
                });
            }
        }
        if targets.is_empty() {
            return Err(CliError::NoTargets);
        }

        Ok(RunPlan {
            group,
            kinds,
            targets,
            aux_tokens: BTreeMap::new(),
        })
    }
}

/// One target per line; blank lines and '#' comments are skipped
fn load_target_file(path: &Path) -> Result<Vec<String>, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::TargetFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}
