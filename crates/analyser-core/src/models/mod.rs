//! Data model for registry entries, package metadata and install results.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Backing package registry for a plugin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Registry {
    Npm,
}

/// Wrapper config describing how to run a plugin.
///
/// Stored verbatim as the installed plugin's `config.json`. Fields the
/// registry adds later survive a round trip through the flattened map.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One plugin's canonical record as known to the central registry.
///
/// The list endpoint returns a name-keyed object; the name is injected
/// into each entry after parsing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistryEntry {
    #[serde(default)]
    pub name: String,
    pub registry: Registry,
    pub config: PluginConfig,
}

/// Package registry metadata for one plugin's published packages.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PackageInfo {
    #[serde(default, rename = "dist-tags")]
    pub dist_tags: HashMap<String, String>,
    #[serde(default)]
    pub versions: HashMap<String, PackageVersion>,
}

/// Per-version metadata within [`PackageInfo`].
#[derive(Debug, Clone, Deserialize)]
pub struct PackageVersion {
    pub dist: DistInfo,
}

/// Distribution info for a published version.
#[derive(Debug, Clone, Deserialize)]
pub struct DistInfo {
    pub tarball: String,
}

/// Result of a newer-version check.
///
/// `newer` is absent when the currently-installed version does not parse
/// as semver; the `latest` pointer is still useful on its own.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VersionCheck {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newer: Option<bool>,
    pub latest: String,
}

/// A plugin reference with its declared per-repo options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyserRef {
    pub name: String,
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl AnalyserRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: serde_json::Map::new(),
        }
    }
}

/// Request for `install_analyser`: a name plus an optional version
/// constraint (`None` and `"latest"` both resolve to the latest dist tag).
#[derive(Debug, Clone, Deserialize)]
pub struct InstallRequest {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl InstallRequest {
    pub fn latest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    pub fn pinned(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
        }
    }
}

/// Result contract of a completed (or reused) install.
#[derive(Debug, Clone, PartialEq)]
pub struct InstalledAnalyser {
    pub path: PathBuf,
    pub config: PluginConfig,
}

/// Repo-level plugin declarations: language -> category -> references.
///
/// BTreeMaps keep flattening order deterministic.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RepoConfig {
    #[serde(flatten)]
    pub languages: BTreeMap<String, LanguageTools>,
}

/// Category-keyed plugin references for one language.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LanguageTools {
    #[serde(flatten)]
    pub categories: BTreeMap<String, Vec<PluginRef>>,
}

/// A single declaration entry: either a bare plugin name or a one-key
/// table mapping the name to its options.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PluginRef {
    Name(String),
    Options(BTreeMap<String, serde_json::Map<String, serde_json::Value>>),
}
