//! Shared plugin lifecycle
//!
//! One composed helper instead of a base class: info validation, resource
//! acquisition, output-directory initialisation and raw-output persistence
//! live here and are used by every behavior variant.

use crate::core::strings::sanitize_for_path;
use crate::plugin::{PluginContext, PluginError, PluginInfo, PluginResult};
use crate::plugin::types::{PluginGroup, PluginKind};
use crate::resource::{Resource, ResourceHandle, ResourceSpec};
use std::path::{Path, PathBuf};

/// How a plugin acquires its resources at construction
#[derive(Debug, Clone)]
pub enum ResourceAcquisition {
    /// Plugin declares no resources
    None,
    /// Resolve immediately; unknown names fail construction
    Eager(ResourceSpec),
    /// Store the spec, resolve on first use
    Lazy(ResourceSpec),
}

pub struct PluginRuntime {
    ctx: PluginContext,
    info: PluginInfo,
    group: PluginGroup,
    kind: PluginKind,
    resources: ResourceHandle,
    output_dir: Option<PathBuf>,
}

impl std::fmt::Debug for PluginRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRuntime")
            .field("info", &self.info)
            .field("group", &self.group)
            .field("kind", &self.kind)
            .field("output_dir", &self.output_dir)
            .finish_non_exhaustive()
    }
}

impl PluginRuntime {
    /// Validate info and acquire resources
    ///
    /// Fails fast: invalid group/kind or (for eager acquisition) an unknown
    /// resource name aborts construction.
    pub fn new(
        ctx: PluginContext,
        info: PluginInfo,
        acquisition: ResourceAcquisition,
    ) -> PluginResult<Self> {
        let (group, kind) = info.validate()?;
        let resources = match acquisition {
            ResourceAcquisition::None => ResourceHandle::none(),
            ResourceAcquisition::Eager(spec) => ResourceHandle::eager(spec, &ctx.resources)?,
            ResourceAcquisition::Lazy(spec) => ResourceHandle::lazy(spec),
        };
        Ok(Self {
            ctx,
            info,
            group,
            kind,
            resources,
            output_dir: None,
        })
    }

    pub fn ctx(&self) -> &PluginContext {
        &self.ctx
    }

    pub fn info(&self) -> &PluginInfo {
        &self.info
    }

    pub fn group(&self) -> PluginGroup {
        self.group
    }

    pub fn kind(&self) -> PluginKind {
        self.kind
    }

    pub fn resource_spec(&self) -> Option<&ResourceSpec> {
        self.resources.spec()
    }

    /// Resolve (lazily if needed) and return the ordered resource sequence
    pub fn resolved_resources(&mut self) -> PluginResult<Vec<Resource>> {
        Ok(self.resources.resolve(&self.ctx.resources)?.to_vec())
    }

    /// Path of this plugin's output directory relative to the group root
    pub fn relative_output_dir(&self) -> PathBuf {
        PathBuf::from(sanitize_for_path(&self.info.title)).join(self.kind.to_string())
    }

    /// Initialise and return the output directory
    ///
    /// Derived as `{group root}/{sanitized title}/{kind}`; creation is
    /// recursive and idempotent, so repeated initialisation is a no-op.
    pub fn output_dir(&mut self) -> PluginResult<&Path> {
        if self.output_dir.is_none() {
            let dir = self
                .ctx
                .settings
                .output
                .for_group(self.group)
                .join(self.relative_output_dir());
            std::fs::create_dir_all(&dir).map_err(|source| PluginError::OutputDir {
                code: self.info.code.clone(),
                path: dir.clone(),
                source,
            })?;
            self.output_dir = Some(dir);
        }
        Ok(self.output_dir.as_deref().unwrap_or_else(|| Path::new("")))
    }

    /// Persist a command's raw output under the output directory
    ///
    /// Returns the file path relative to the group root, the form the
    /// reporting collaborator links to.
    pub fn dump_raw_output(&mut self, display_name: &str, raw_output: &str) -> PluginResult<String> {
        let file_name = format!("{}.txt", sanitize_for_path(display_name));
        let code = self.info.code.clone();
        let dir = self.output_dir()?.to_path_buf();
        std::fs::write(dir.join(&file_name), raw_output).map_err(|source| {
            PluginError::OutputDump { code, source }
        })?;
        Ok(self
            .relative_output_dir()
            .join(file_name)
            .to_string_lossy()
            .into_owned())
    }
}
