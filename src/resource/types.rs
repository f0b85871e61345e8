//! Resource data types

use crate::resource::{ResourceResult, ResourceStore};

/// A single resolved resource: a display name and the command template
/// registered under it
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Resource {
    pub display_name: String,
    pub command_template: String,
}

impl Resource {
    pub fn new(display_name: impl Into<String>, command_template: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            command_template: command_template.into(),
        }
    }
}

/// What a plugin declares about its resources
///
/// The shape is a static tagged variant, not a runtime type inspection:
/// passive plugins dispatch on `Tabbed` vs the flat shapes at the call site.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceSpec {
    /// One symbolic name resolving to its complete resource group
    Name(String),
    /// Several symbolic names, resolved groups concatenated in order
    Names(Vec<String>),
    /// Tab label to symbolic name, insertion order preserved
    Tabs(Vec<(String, String)>),
}

impl ResourceSpec {
    /// Resolve against a store into one flat ordered sequence
    pub fn resolve(&self, store: &ResourceStore) -> ResourceResult<Vec<Resource>> {
        match self {
            ResourceSpec::Name(name) => store.resolve(name),
            ResourceSpec::Names(names) => store.resolve_all(names),
            ResourceSpec::Tabs(tabs) => {
                let names: Vec<String> = tabs.iter().map(|(_, name)| name.clone()).collect();
                store.resolve_all(&names)
            }
        }
    }
}

/// Resource acquisition state owned by a plugin for its lifetime
///
/// Eager handles resolve at construction; lazy handles store the spec and
/// resolve on first use, trading eager validation for startup latency.
#[derive(Debug, Clone)]
pub struct ResourceHandle {
    spec: Option<ResourceSpec>,
    resolved: Option<Vec<Resource>>,
}

impl ResourceHandle {
    pub fn none() -> Self {
        Self {
            spec: None,
            resolved: None,
        }
    }

    pub fn eager(spec: ResourceSpec, store: &ResourceStore) -> ResourceResult<Self> {
        let resolved = spec.resolve(store)?;
        Ok(Self {
            spec: Some(spec),
            resolved: Some(resolved),
        })
    }

    pub fn lazy(spec: ResourceSpec) -> Self {
        Self {
            spec: Some(spec),
            resolved: None,
        }
    }

    pub fn spec(&self) -> Option<&ResourceSpec> {
        self.spec.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// Resolve if not yet done and return the ordered resource sequence
    ///
    /// A handle with no spec resolves to the empty sequence.
    pub fn resolve(&mut self, store: &ResourceStore) -> ResourceResult<&[Resource]> {
        if self.resolved.is_none() {
            let resolved = match &self.spec {
                Some(spec) => spec.resolve(store)?,
                None => Vec::new(),
            };
            self.resolved = Some(resolved);
        }
        Ok(self.resolved.as_deref().unwrap_or(&[]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceError;

    fn store() -> ResourceStore {
        let mut store = ResourceStore::new();
        store.register("scan", Resource::new("Port scan", "nmap {TARGET}"));
        store.register("scan", Resource::new("Service scan", "nmap -sV {TARGET}"));
        store.register("whois", Resource::new("Whois", "whois {TARGET}"));
        store
    }

    #[test]
    fn test_named_spec_resolves_whole_group() {
        let resolved = ResourceSpec::Name("scan".into()).resolve(&store()).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].display_name, "Port scan");
        assert_eq!(resolved[1].display_name, "Service scan");
    }

    #[test]
    fn test_list_spec_concatenates_in_order() {
        let spec = ResourceSpec::Names(vec!["whois".into(), "scan".into()]);
        let resolved = spec.resolve(&store()).unwrap();
        let names: Vec<_> = resolved.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, vec!["Whois", "Port scan", "Service scan"]);
    }

    #[test]
    fn test_lazy_handle_defers_resolution() {
        let mut handle = ResourceHandle::lazy(ResourceSpec::Name("whois".into()));
        assert!(!handle.is_resolved());
        let resolved = handle.resolve(&store()).unwrap();
        assert_eq!(resolved.len(), 1);
        assert!(handle.is_resolved());
    }

    #[test]
    fn test_eager_handle_fails_fast_on_unknown_name() {
        let err = ResourceHandle::eager(ResourceSpec::Name("nope".into()), &store()).unwrap_err();
        assert!(matches!(err, ResourceError::NotFound { ref name } if name == "nope"));
    }

    #[test]
    fn test_handle_without_spec_resolves_empty() {
        let mut handle = ResourceHandle::none();
        assert!(handle.resolve(&store()).unwrap().is_empty());
    }
}
