//! The public orchestrator over registry, resolver and installer.

use crate::install_dir::InstallDirManager;
use crate::installer::ArchiveInstaller;
use crate::progress::{InstallEvent, ProgressSender};
use analyser_core::models::{
    AnalyserRef, InstallRequest, InstalledAnalyser, PluginRef, RegistryEntry, RepoConfig,
    VersionCheck,
};
use analyser_core::registry::RegistryClient;
use analyser_core::resolver;
use analyser_core::{platform, AnalyserError, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

/// Orchestrates analyser installs: registry lookups, version
/// resolution, on-disk installs and repo-config flattening.
///
/// Holds the only plugin-list cache; nothing here is process-global, so
/// two managers with different roots never interfere.
pub struct AnalyserManager {
    registry: RegistryClient,
    installer: ArchiveInstaller,
    dirs: InstallDirManager,
    plugin_cache: RwLock<Option<Arc<HashMap<String, RegistryEntry>>>>,
    progress: ProgressSender,
}

impl AnalyserManager {
    /// Create a manager rooted at the platform default install root.
    pub fn new() -> Result<Self> {
        Self::with_root(platform::default_install_root()?)
    }

    /// Create a manager with an explicit install root.
    pub fn with_root(install_root: impl Into<PathBuf>) -> Result<Self> {
        Self::with_registry(RegistryClient::new()?, install_root)
    }

    /// Create a manager against a custom registry client. Used by tests
    /// and air-gapped mirrors.
    pub fn with_registry(
        registry: RegistryClient,
        install_root: impl Into<PathBuf>,
    ) -> Result<Self> {
        Ok(Self {
            registry,
            installer: ArchiveInstaller::new()?,
            dirs: InstallDirManager::new(install_root),
            plugin_cache: RwLock::new(None),
            progress: ProgressSender::disabled(),
        })
    }

    /// The install root this manager operates on.
    pub fn install_root(&self) -> &std::path::Path {
        self.dirs.root()
    }

    /// Subscribe to install lifecycle events.
    ///
    /// Replaces any previous subscription. Events are best-effort: a
    /// dropped receiver never fails an install.
    pub fn event_stream(&mut self) -> mpsc::Receiver<InstallEvent> {
        let (tx, rx) = mpsc::channel(32);
        self.progress = ProgressSender::new(tx);
        rx
    }

    /// Prepare the manager for use: ensure the install root is usable
    /// and warm the plugin-list cache.
    pub async fn init(&self) -> Result<()> {
        self.dirs.ensure_root()?;
        self.plugin_list(true).await?;
        Ok(())
    }

    /// The canonical plugin list, fetched once and cached until `force`.
    pub async fn plugin_list(&self, force: bool) -> Result<Arc<HashMap<String, RegistryEntry>>> {
        if !force {
            if let Some(cached) = self.plugin_cache.read().await.as_ref() {
                return Ok(Arc::clone(cached));
            }
        }

        let fetched = Arc::new(self.registry.fetch_plugin_list().await?);
        *self.plugin_cache.write().await = Some(Arc::clone(&fetched));
        Ok(fetched)
    }

    /// The canonical record of a plugin as the central registry knows
    /// it, independent of anything installed locally.
    pub async fn fetch_canonical_config(&self, name: &str) -> Result<RegistryEntry> {
        self.registry_entry(name).await
    }

    /// Look up an already-installed analyser without installing.
    ///
    /// Strictly read-only: a missing install directory is
    /// `AnalyserFetch`, never an implicit install.
    pub fn fetch_analyser(&self, name: &str, version: &str) -> Result<InstalledAnalyser> {
        let dir = self.dirs.plugin_dir(name, version);
        if !dir.is_dir() {
            return Err(AnalyserError::AnalyserFetch {
                name: name.to_string(),
                version: version.to_string(),
            });
        }
        let config = self.dirs.read_config(&dir)?;
        Ok(InstalledAnalyser { path: dir, config })
    }

    /// Install an analyser, reusing an existing install of the same
    /// version unless `force` is set.
    pub async fn install_analyser(
        &self,
        request: &InstallRequest,
        force: bool,
    ) -> Result<InstalledAnalyser> {
        let entry = self.registry_entry(&request.name).await?;

        let version = match request.version.as_deref() {
            Some(v) if v != analyser_core::config::RegistryConfig::LATEST_TAG => v.to_string(),
            _ => {
                self.is_newer_version_available(&request.name, None)
                    .await?
                    .latest
            }
        };

        let dir = self.dirs.plugin_dir(&request.name, &version);
        if dir.is_dir() {
            if !force {
                debug!("Reusing existing install at {}", dir.display());
                let config = self.dirs.read_config(&dir)?;
                return Ok(InstalledAnalyser { path: dir, config });
            }
            info!("Forced reinstall of {}@{}", request.name, version);
            self.dirs.remove_plugin_dir(&request.name, &version)?;
        }

        match self
            .installer
            .install(&self.registry, &self.dirs, &entry, &version, &self.progress)
            .await
        {
            Ok(config) => Ok(InstalledAnalyser { path: dir, config }),
            Err(e) => {
                self.progress
                    .send(InstallEvent::Failed {
                        analyser: request.name.clone(),
                        version: version.clone(),
                        message: e.to_string(),
                    })
                    .await;
                Err(e)
            }
        }
    }

    /// Compare a (possibly absent) current version against the latest
    /// published one.
    pub async fn is_newer_version_available(
        &self,
        name: &str,
        current: Option<&str>,
    ) -> Result<VersionCheck> {
        let info = self.registry.fetch_package_info(name).await?;
        let latest = resolver::resolve(name, None, &info)?;
        resolver::check_newer(current, &latest)
    }

    /// The newest locally installed version of an analyser, if any.
    pub fn latest_installed_version(&self, name: &str) -> Result<Option<String>> {
        self.dirs.latest_installed_version(name)
    }

    /// Every install directory currently under the root.
    pub fn installed_analysers(&self) -> Result<Vec<String>> {
        self.dirs.list_all_installed()
    }

    /// Filter a list of analyser references down to plugins the central
    /// registry knows. Unknown names are dropped, not an error.
    pub async fn validate_analyser_list(
        &self,
        analysers: Vec<AnalyserRef>,
    ) -> Result<Vec<AnalyserRef>> {
        let known = self.plugin_list(false).await?;
        let (valid, dropped): (Vec<_>, Vec<_>) = analysers
            .into_iter()
            .partition(|a| known.contains_key(&a.name));

        for unknown in &dropped {
            warn!("Dropping unknown analyser {}", unknown.name);
        }
        Ok(valid)
    }

    /// Flatten a repo config's language/category tree into an ordered,
    /// deduplicated analyser list.
    ///
    /// The first occurrence of a name wins its position; options from
    /// later occurrences fill in keys the first did not set and never
    /// override existing ones.
    pub fn analysers_for_config(&self, config: &RepoConfig) -> Vec<AnalyserRef> {
        let mut ordered: Vec<AnalyserRef> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for tools in config.languages.values() {
            for refs in tools.categories.values() {
                for plugin_ref in refs {
                    match plugin_ref {
                        PluginRef::Name(name) => {
                            merge_ref(&mut ordered, &mut seen, name, None);
                        }
                        PluginRef::Options(table) => {
                            for (name, options) in table {
                                merge_ref(&mut ordered, &mut seen, name, Some(options));
                            }
                        }
                    }
                }
            }
        }

        ordered
    }

    async fn registry_entry(&self, name: &str) -> Result<RegistryEntry> {
        let list = self.plugin_list(false).await?;
        list.get(name)
            .cloned()
            .ok_or_else(|| AnalyserError::UnknownPlugin {
                name: name.to_string(),
            })
    }
}

fn merge_ref(
    ordered: &mut Vec<AnalyserRef>,
    seen: &mut HashMap<String, usize>,
    name: &str,
    options: Option<&serde_json::Map<String, serde_json::Value>>,
) {
    let index = *seen.entry(name.to_string()).or_insert_with(|| {
        ordered.push(AnalyserRef::new(name));
        ordered.len() - 1
    });

    if let Some(options) = options {
        let existing = &mut ordered[index].options;
        for (key, value) in options {
            existing.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
}
