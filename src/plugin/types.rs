//! Type definitions for the plugin system

use std::path::PathBuf;
use std::str::FromStr;

/// Plugin group classification
///
/// Groups decide how targets are interpreted: `web` targets are URLs, `net`
/// targets are hosts or network ranges, `aux` targets are opaque parameters
/// left to the plugin and its resources.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PluginGroup {
    Web,
    Net,
    Aux,
}

/// Plugin capability classification
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PluginKind {
    Abstract,
    Active,
    Passive,
    SemiPassive,
    Grep,
    External,
}

/// Immutable plugin descriptor
///
/// Group and kind arrive as free-form strings from plugin declarations and
/// are validated exactly once, at plugin construction. The description
/// doubles as the human-readable result text in reports.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PluginInfo {
    pub group: String,
    pub kind: String,
    pub title: String,
    pub code: String,
    pub file_path: PathBuf,
    #[serde(default)]
    pub description: String,
}

impl PluginInfo {
    /// Parse group and kind against their enumerated domains
    pub fn validate(&self) -> crate::plugin::PluginResult<(PluginGroup, PluginKind)> {
        let group = PluginGroup::from_str(&self.group).map_err(|_| {
            crate::plugin::PluginError::InvalidInfo {
                code: self.code.clone(),
                field: "group",
                value: self.group.clone(),
            }
        })?;
        let kind = PluginKind::from_str(&self.kind).map_err(|_| {
            crate::plugin::PluginError::InvalidInfo {
                code: self.code.clone(),
                field: "type",
                value: self.kind.clone(),
            }
        })?;
        Ok((group, kind))
    }
}
