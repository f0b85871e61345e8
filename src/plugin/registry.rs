//! Plugin registry: declarations loaded from TOML
//!
//! Plugins are declared, not compiled in: a `[[plugins]]` table per plugin
//! carries the identifying info plus the behavior parameters for its kind.
//! The registry validates nothing at load time beyond TOML shape; info
//! validation happens when a declaration is instantiated.

use crate::plugin::active::ActiveBehavior;
use crate::plugin::core::{Plugin, PluginBehavior};
use crate::plugin::external::ExternalBehavior;
use crate::plugin::grep::GrepBehavior;
use crate::plugin::passive::{PassiveBehavior, SuggestedCommands};
use crate::plugin::semi_passive::{SemiPassiveBehavior, UrlListRequest};
use crate::plugin::types::{PluginGroup, PluginInfo, PluginKind};
use crate::plugin::{PluginContext, PluginError, PluginResult, ResourceAcquisition};
use crate::resource::ResourceSpec;
use std::path::{Path, PathBuf};

/// One declared plugin, the on-disk unit of the registry
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginDecl {
    pub code: String,
    pub group: String,
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Set from the file the declaration was loaded from
    #[serde(skip)]
    pub file_path: PathBuf,

    #[serde(default)]
    pub resource: Option<ResourceSpec>,
    /// Defer resource resolution to first use instead of construction
    #[serde(default)]
    pub lazy_resources: bool,

    /// Active: dereference harvested URLs after import
    #[serde(default)]
    pub visit_urls: bool,

    /// Grep: pattern names; empty means the configured defaults
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Semi-passive: captured transactions to report on
    #[serde(default)]
    pub transaction_ids: Vec<u64>,
    #[serde(default)]
    pub url_list: Option<UrlListDecl>,

    /// Passive: suggested command box
    #[serde(default)]
    pub suggested_commands: Option<SuggestedCommandsDecl>,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UrlListDecl {
    pub url_types: Vec<String>,
    #[serde(default = "default_true")]
    pub use_cache: bool,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuggestedCommandsDecl {
    pub header: String,
    #[serde(default)]
    pub categories: Vec<(String, String)>,
}

fn default_true() -> bool {
    true
}

fn default_method() -> String {
    "GET".to_string()
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryFile {
    #[serde(default)]
    plugins: Vec<PluginDecl>,
}

impl PluginDecl {
    pub fn info(&self) -> PluginInfo {
        PluginInfo {
            group: self.group.clone(),
            kind: self.kind.clone(),
            title: self.title.clone(),
            code: self.code.clone(),
            file_path: self.file_path.clone(),
            description: self.description.clone(),
        }
    }
}

/// All declared plugins, in declaration order
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<PluginDecl>,
}

impl PluginRegistry {
    pub fn load(path: &Path) -> PluginResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| PluginError::Registry {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml(&raw, path)
    }

    pub fn from_toml(raw: &str, file_path: &Path) -> PluginResult<Self> {
        let file: RegistryFile = toml::from_str(raw).map_err(|e| PluginError::Registry {
            message: e.to_string(),
        })?;
        let mut plugins = file.plugins;
        for decl in &mut plugins {
            decl.file_path = file_path.to_path_buf();
        }
        Ok(Self { plugins })
    }

    pub fn all(&self) -> &[PluginDecl] {
        &self.plugins
    }

    pub fn find(&self, code: &str) -> Option<&PluginDecl> {
        self.plugins.iter().find(|p| p.code == code)
    }

    /// Declarations matching the given group/kind/code filters, in order
    ///
    /// `only` and `except` hold plugin codes; `only` wins when both are
    /// given. A `kind` of `None` matches every kind.
    pub fn select(
        &self,
        group: PluginGroup,
        kind: Option<PluginKind>,
        only: &[String],
        except: &[String],
    ) -> Vec<&PluginDecl> {
        self.plugins
            .iter()
            .filter(|p| p.group == group.to_string())
            .filter(|p| kind.map_or(true, |k| p.kind == k.to_string()))
            .filter(|p| {
                if !only.is_empty() {
                    only.contains(&p.code)
                } else {
                    !except.contains(&p.code)
                }
            })
            .collect()
    }

    /// Build a runnable plugin from a declaration
    ///
    /// Info validation and eager resource resolution happen here; a bad
    /// declaration fails before anything runs.
    pub fn instantiate(&self, decl: &PluginDecl, ctx: PluginContext) -> PluginResult<Plugin> {
        let info = decl.info();
        let (_, kind) = info.validate()?;

        let behavior = match kind {
            PluginKind::Active => PluginBehavior::Active(ActiveBehavior {
                visit_imported_urls: decl.visit_urls,
            }),
            PluginKind::Passive => PluginBehavior::Passive(PassiveBehavior {
                suggested_commands: decl.suggested_commands.as_ref().map(|s| SuggestedCommands {
                    header: s.header.clone(),
                    categories: s.categories.clone(),
                }),
            }),
            PluginKind::SemiPassive => PluginBehavior::SemiPassive(SemiPassiveBehavior {
                transaction_ids: decl.transaction_ids.clone(),
                url_list_request: decl.url_list.as_ref().map(|u| UrlListRequest {
                    url_types: u.url_types.clone(),
                    use_cache: u.use_cache,
                    method: u.method.clone(),
                    data: u.data.clone(),
                }),
            }),
            PluginKind::Grep => PluginBehavior::Grep(GrepBehavior {
                pattern_names: decl.patterns.clone(),
            }),
            PluginKind::External => PluginBehavior::External(ExternalBehavior),
            // Abstract declarations are composition stubs, never run directly
            PluginKind::Abstract => {
                return Err(PluginError::Registry {
                    message: format!("plugin '{}' is abstract and cannot run", decl.code),
                });
            }
        };

        let acquisition = match &decl.resource {
            None => ResourceAcquisition::None,
            Some(spec) if decl.lazy_resources => ResourceAcquisition::Lazy(spec.clone()),
            Some(spec) => ResourceAcquisition::Eager(spec.clone()),
        };

        Plugin::new(ctx, info, behavior, acquisition)
    }
}
