//! Install directory management.
//!
//! Owns the on-disk layout: one `{name}@{version}` directory per
//! installed plugin under a single root, each holding a `config.json`
//! and the extracted payload. Versions are encoded in directory names
//! on purpose; this module is the only place that parses them, so a
//! manifest-backed store could replace the scheme without touching the
//! rest of the pipeline.

use analyser_core::config::PathsConfig;
use analyser_core::jsonc;
use analyser_core::models::PluginConfig;
use analyser_core::{AnalyserError, Result};
use semver::Version;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Manages the local install root and its version-named subdirectories.
#[derive(Debug, Clone)]
pub struct InstallDirManager {
    root: PathBuf,
}

impl InstallDirManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory all plugin version directories live under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensure the root exists and is writable.
    ///
    /// Performed once at orchestrator initialization, not per operation.
    pub fn ensure_root(&self) -> Result<()> {
        if !self.root.exists() {
            debug!("Creating install root {}", self.root.display());
            fs::create_dir_all(&self.root).map_err(|e| AnalyserError::RootCreate {
                path: self.root.clone(),
                source: e,
            })?;
        }

        let probe = self.root.join(".write-probe");
        match fs::write(&probe, b"") {
            Ok(()) => {
                let _ = fs::remove_file(&probe);
                Ok(())
            }
            Err(_) => Err(AnalyserError::RootUnwritable {
                path: self.root.clone(),
            }),
        }
    }

    /// Directory a given plugin version installs into.
    pub fn plugin_dir(&self, name: &str, version: &str) -> PathBuf {
        self.root.join(format!(
            "{}{}{}",
            name,
            PathsConfig::VERSION_SEPARATOR,
            version
        ))
    }

    /// Read and parse the `config.json` beneath an install directory.
    ///
    /// Comments are permitted and stripped before parsing; anything that
    /// still fails to parse is `ConfigParse`, never a partial value.
    pub fn read_config(&self, install_dir: &Path) -> Result<PluginConfig> {
        let path = install_dir.join(PathsConfig::CONFIG_FILENAME);
        let contents = fs::read_to_string(&path).map_err(|e| AnalyserError::ConfigRead {
            path: path.clone(),
            source: e,
        })?;
        jsonc::from_str(&contents).map_err(|e| AnalyserError::ConfigParse { path, source: e })
    }

    /// Materialize a plugin config as `config.json` inside a directory.
    pub fn write_config(&self, install_dir: &Path, config: &PluginConfig) -> Result<()> {
        let path = install_dir.join(PathsConfig::CONFIG_FILENAME);
        let contents = serde_json::to_string_pretty(config)?;
        fs::write(&path, contents).map_err(|e| AnalyserError::io_with_path(e, path))
    }

    /// Versions of a plugin present on disk, ascending semver order.
    ///
    /// Directory suffixes that are not valid semantic versions are
    /// ignored.
    pub fn list_installed_versions(&self, name: &str) -> Result<Vec<String>> {
        let prefix = format!("{}{}", name, PathsConfig::VERSION_SEPARATOR);
        let mut versions: Vec<Version> = Vec::new();

        for entry_name in self.subdirectory_names()? {
            if let Some(suffix) = entry_name.strip_prefix(&prefix) {
                match Version::parse(suffix) {
                    Ok(version) => versions.push(version),
                    Err(_) => {
                        debug!("Ignoring non-semver install directory {}", entry_name);
                    }
                }
            }
        }

        versions.sort();
        Ok(versions.into_iter().map(|v| v.to_string()).collect())
    }

    /// The newest locally installed version of a plugin, if any.
    pub fn latest_installed_version(&self, name: &str) -> Result<Option<String>> {
        Ok(self.list_installed_versions(name)?.pop())
    }

    /// Every `{name}@{version}` directory name under the root,
    /// unfiltered by semver validity. Diagnostic inventory only.
    pub fn list_all_installed(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .subdirectory_names()?
            .into_iter()
            .filter(|n| n.contains(PathsConfig::VERSION_SEPARATOR))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Recursively delete a plugin version directory (forced reinstall).
    pub fn remove_plugin_dir(&self, name: &str, version: &str) -> Result<()> {
        let dir = self.plugin_dir(name, version);
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|e| AnalyserError::io_with_path(e, dir))?;
        }
        Ok(())
    }

    fn subdirectory_names(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.root)
            .map_err(|e| AnalyserError::io_with_path(e, self.root.clone()))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| AnalyserError::io_with_path(e, self.root.clone()))?;
            if entry.path().is_dir() {
                if let Ok(name) = entry.file_name().into_string() {
                    names.push(name);
                }
            }
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager() -> (InstallDirManager, TempDir) {
        let temp = TempDir::new().unwrap();
        (InstallDirManager::new(temp.path()), temp)
    }

    #[test]
    fn test_ensure_root_creates_missing_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("nested").join("analysers");
        let dirs = InstallDirManager::new(&root);

        dirs.ensure_root().unwrap();
        assert!(root.is_dir());
        // Idempotent on an existing root.
        dirs.ensure_root().unwrap();
    }

    #[test]
    fn test_plugin_dir_naming() {
        let (dirs, temp) = manager();
        assert_eq!(
            dirs.plugin_dir("eslint", "1.2.3"),
            temp.path().join("eslint@1.2.3")
        );
    }

    #[test]
    fn test_config_round_trip() {
        let (dirs, temp) = manager();
        let install_dir = temp.path().join("eslint@1.2.3");
        fs::create_dir(&install_dir).unwrap();

        let config = PluginConfig {
            version: Some("1.2.3".into()),
            short_name: Some("eslint".into()),
            command: Some("eslint .".into()),
            ..Default::default()
        };
        dirs.write_config(&install_dir, &config).unwrap();

        let read_back = dirs.read_config(&install_dir).unwrap();
        assert_eq!(read_back, config);
    }

    #[test]
    fn test_read_config_with_comments() {
        let (dirs, temp) = manager();
        let install_dir = temp.path().join("eslint@1.2.3");
        fs::create_dir(&install_dir).unwrap();
        fs::write(
            install_dir.join("config.json"),
            "{\n  // pinned by registry\n  \"version\": \"1.2.3\"\n}",
        )
        .unwrap();

        let config = dirs.read_config(&install_dir).unwrap();
        assert_eq!(config.version.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn test_read_config_missing_file_is_config_read() {
        let (dirs, temp) = manager();
        let install_dir = temp.path().join("eslint@1.2.3");
        fs::create_dir(&install_dir).unwrap();

        let err = dirs.read_config(&install_dir).unwrap_err();
        assert!(matches!(err, AnalyserError::ConfigRead { .. }));
    }

    #[test]
    fn test_read_config_invalid_json_is_config_parse() {
        let (dirs, temp) = manager();
        let install_dir = temp.path().join("eslint@1.2.3");
        fs::create_dir(&install_dir).unwrap();
        fs::write(install_dir.join("config.json"), "{ broken json ]").unwrap();

        let err = dirs.read_config(&install_dir).unwrap_err();
        assert!(matches!(err, AnalyserError::ConfigParse { .. }));
    }

    #[test]
    fn test_list_installed_versions_filters_and_sorts() {
        let (dirs, temp) = manager();
        for name in [
            "eslint@1.2.3",
            "eslint@0.9.0",
            "eslint@10.0.0",
            "eslint@not-a-version",
            "eslint@1.2", // incomplete semver, ignored
            "pylint@2.0.0",
        ] {
            fs::create_dir(temp.path().join(name)).unwrap();
        }
        // A stray file should never be mistaken for an install.
        fs::write(temp.path().join("eslint@3.0.0"), b"file, not dir").unwrap();

        let versions = dirs.list_installed_versions("eslint").unwrap();
        assert_eq!(versions, vec!["0.9.0", "1.2.3", "10.0.0"]);
    }

    #[test]
    fn test_latest_installed_version_uses_semver_order() {
        let (dirs, temp) = manager();
        for name in ["eslint@2.0.0", "eslint@10.0.0", "eslint@9.1.0"] {
            fs::create_dir(temp.path().join(name)).unwrap();
        }

        let latest = dirs.latest_installed_version("eslint").unwrap();
        assert_eq!(latest.as_deref(), Some("10.0.0"));

        assert_eq!(dirs.latest_installed_version("pylint").unwrap(), None);
    }

    #[test]
    fn test_list_all_installed_is_unfiltered_inventory() {
        let (dirs, temp) = manager();
        for name in ["eslint@1.2.3", "pylint@not-a-version", "no-separator"] {
            fs::create_dir(temp.path().join(name)).unwrap();
        }

        let all = dirs.list_all_installed().unwrap();
        assert_eq!(all, vec!["eslint@1.2.3", "pylint@not-a-version"]);
    }

    #[test]
    fn test_remove_plugin_dir() {
        let (dirs, temp) = manager();
        let dir = temp.path().join("eslint@1.2.3");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("payload.js"), b"x").unwrap();

        dirs.remove_plugin_dir("eslint", "1.2.3").unwrap();
        assert!(!dir.exists());
        // Removing an absent directory is a no-op.
        dirs.remove_plugin_dir("eslint", "1.2.3").unwrap();
    }

    #[test]
    fn test_listing_on_missing_root_is_empty() {
        let temp = TempDir::new().unwrap();
        let dirs = InstallDirManager::new(temp.path().join("never-created"));
        assert!(dirs.list_installed_versions("eslint").unwrap().is_empty());
        assert!(dirs.list_all_installed().unwrap().is_empty());
    }
}
