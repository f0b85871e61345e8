//! Resource store: symbolic name to command group lookup
//!
//! The backing map is loaded once (from TOML or programmatically) and read
//! repeatedly; `resolve` has no side effects and performs no caching.

use crate::resource::{Resource, ResourceError, ResourceResult};
use std::collections::BTreeMap;
use std::path::Path;

/// Ordered groups of command templates keyed by symbolic name
#[derive(Debug, Clone, Default)]
pub struct ResourceStore {
    groups: BTreeMap<String, Vec<Resource>>,
}

/// On-disk shape: `[[resources]]` entries with `name`, `display_name`, `command`
#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ResourceFile {
    #[serde(default)]
    resources: Vec<ResourceEntry>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ResourceEntry {
    name: String,
    display_name: String,
    command: String,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load resource definitions from a TOML file
    pub fn load(path: &Path) -> ResourceResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ResourceError::Parse {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> ResourceResult<Self> {
        let file: ResourceFile = toml::from_str(raw).map_err(|e| ResourceError::Parse {
            message: e.to_string(),
        })?;
        let mut store = Self::new();
        for entry in file.resources {
            store.register(&entry.name, Resource::new(entry.display_name, entry.command));
        }
        Ok(store)
    }

    /// Append a resource to the group registered under `name`
    pub fn register(&mut self, name: &str, resource: Resource) {
        self.groups.entry(name.to_string()).or_default().push(resource);
    }

    /// Resolve one symbolic name to its complete ordered group
    pub fn resolve(&self, name: &str) -> ResourceResult<Vec<Resource>> {
        self.groups
            .get(name)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound {
                name: name.to_string(),
            })
    }

    /// Resolve several names, concatenating groups in the given order
    pub fn resolve_all(&self, names: &[String]) -> ResourceResult<Vec<Resource>> {
        let mut out = Vec::new();
        for name in names {
            out.extend(self.resolve(name)?);
        }
        Ok(out)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }
}
