//! Settings struct and TOML loading

use crate::config::{ConfigError, ConfigResult};
use crate::plugin::types::PluginGroup;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Engine-wide settings
///
/// Every field is enumerated here; `deny_unknown_fields` turns a typo in the
/// settings file into a load-time error instead of a silently ignored key.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Settings {
    /// Output roots per plugin group
    pub output: OutputRoots,

    /// Substitution token table; `{KEY}` in a command template becomes the value
    pub tokens: BTreeMap<String, String>,

    /// Resource display name whose output is treated as a newline-delimited URL list
    pub extract_urls_sentinel: String,

    /// Named header/body match patterns for grep plugins
    pub grep: GrepSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output: OutputRoots::default(),
            tokens: BTreeMap::new(),
            extract_urls_sentinel: "Extract URLs".to_string(),
            grep: GrepSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Derive a per-target copy: `{TARGET}` token set and output roots
    /// nested under the sanitized target name (aux output stays shared).
    pub fn for_target(&self, target: &str) -> Self {
        let mut settings = self.clone();
        settings
            .tokens
            .insert("TARGET".to_string(), target.to_string());
        let dir = crate::core::strings::sanitize_for_path(target);
        settings.output.web = self.output.web.join(&dir);
        settings.output.net = self.output.net.join(&dir);
        settings
    }
}

/// Per-group base paths for plugin output directories
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct OutputRoots {
    pub web: PathBuf,
    pub net: PathBuf,
    pub aux: PathBuf,
}

impl Default for OutputRoots {
    fn default() -> Self {
        Self {
            web: PathBuf::from("probekit_review/targets"),
            net: PathBuf::from("probekit_review/targets"),
            aux: PathBuf::from("probekit_review/aux"),
        }
    }
}

impl OutputRoots {
    pub fn for_group(&self, group: PluginGroup) -> &Path {
        match group {
            PluginGroup::Web => &self.web,
            PluginGroup::Net => &self.net,
            PluginGroup::Aux => &self.aux,
        }
    }
}

/// Grep plugin pattern configuration
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GrepSettings {
    /// Pattern names applied when a grep plugin supplies none of its own
    pub default_patterns: Vec<String>,
    pub patterns: BTreeMap<String, GrepPattern>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrepPattern {
    pub part: GrepPart,
    pub pattern: String,
}

/// Which part of a captured transaction a pattern applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrepPart {
    Header,
    Body,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.extract_urls_sentinel, "Extract URLs");
        assert_eq!(
            settings.output.for_group(PluginGroup::Aux),
            Path::new("probekit_review/aux")
        );
        assert!(settings.tokens.is_empty());
    }

    #[test]
    fn test_load_from_toml() {
        let raw = r#"
            extract_urls_sentinel = "Harvest URLs"

            [output]
            web = "out/web"
            net = "out/net"
            aux = "out/aux"

            [tokens]
            PORT = "80"
            HOST = "x.test"

            [grep]
            default_patterns = ["cookies"]

            [grep.patterns.cookies]
            part = "header"
            pattern = "(?i)set-cookie:"
        "#;
        let settings = Settings::from_toml(raw).unwrap();
        assert_eq!(settings.extract_urls_sentinel, "Harvest URLs");
        assert_eq!(settings.tokens.get("PORT").unwrap(), "80");
        assert_eq!(settings.grep.default_patterns, vec!["cookies"]);
        assert_eq!(
            settings.grep.patterns.get("cookies").unwrap().part,
            GrepPart::Header
        );
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let raw = r#"
            extract_urls_sentinel = "Extract URLs"
            totally_unknown = true
        "#;
        let err = Settings::from_toml(raw).unwrap_err();
        assert!(err.to_string().contains("Invalid settings"));
    }

    #[test]
    fn test_for_target_scopes_roots_and_token() {
        let settings = Settings::default();
        let scoped = settings.for_target("http://x.test");
        assert_eq!(scoped.tokens.get("TARGET").unwrap(), "http://x.test");
        assert!(scoped.output.web.ends_with("httpx.test"));
        // Aux root is shared across targets
        assert_eq!(scoped.output.aux, settings.output.aux);
    }
}
