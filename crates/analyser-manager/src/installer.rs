//! Archive installation: download, extract, hook.
//!
//! Takes a plugin whose version is already concrete and materializes it
//! under the install root. Steps run sequentially with no retries; a
//! failed hook leaves the partial directory in place for diagnosis.

use crate::install_dir::InstallDirManager;
use crate::progress::{InstallEvent, ProgressSender};
use analyser_core::config::NetworkConfig;
use analyser_core::models::{PluginConfig, RegistryEntry};
use analyser_core::platform;
use analyser_core::registry::RegistryClient;
use analyser_core::{AnalyserError, Result};
use flate2::read::GzDecoder;
use futures::StreamExt;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Downloads and extracts plugin tarballs.
pub struct ArchiveInstaller {
    http: reqwest::Client,
}

impl ArchiveInstaller {
    pub fn new() -> Result<Self> {
        // Connect timeout only; large tarballs may take longer than any
        // fixed overall timeout.
        let http = reqwest::Client::builder()
            .connect_timeout(NetworkConfig::CONNECT_TIMEOUT)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| AnalyserError::Config {
                message: format!("Failed to create download client: {}", e),
            })?;
        Ok(Self { http })
    }

    /// Install a concrete plugin version into the install root.
    ///
    /// Returns the plugin's config as known centrally, not anything read
    /// back from disk.
    pub async fn install(
        &self,
        registry: &RegistryClient,
        dirs: &InstallDirManager,
        entry: &RegistryEntry,
        version: &str,
        progress: &ProgressSender,
    ) -> Result<PluginConfig> {
        let name = entry.name.as_str();
        info!("Installing {}@{}", name, version);

        progress
            .send(InstallEvent::Downloading {
                analyser: name.to_string(),
                version: version.to_string(),
            })
            .await;

        let info = registry.fetch_package_info(name).await?;
        let tarball_url = info
            .versions
            .get(version)
            .map(|v| v.dist.tarball.clone())
            .ok_or_else(|| AnalyserError::VersionNotFound {
                name: name.to_string(),
                version: version.to_string(),
            })?;

        let target_dir = dirs.plugin_dir(name, version);
        if let Some(parent) = target_dir.parent() {
            fs::create_dir_all(parent).map_err(|e| AnalyserError::DirectoryCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        // Plain create_dir: when two installs of the same plugin+version
        // race, the loser fails here instead of corrupting the winner.
        fs::create_dir(&target_dir).map_err(|e| AnalyserError::DirectoryCreate {
            path: target_dir.clone(),
            source: e,
        })?;

        let tarball_path = target_dir.join(format!("{}-{}.tgz", name, version));
        self.download_tarball(&tarball_url, &tarball_path).await?;

        progress
            .send(InstallEvent::Downloaded {
                analyser: name.to_string(),
                version: version.to_string(),
            })
            .await;

        progress
            .send(InstallEvent::Installing {
                analyser: name.to_string(),
                version: version.to_string(),
            })
            .await;

        extract_tarball(&tarball_path, &target_dir)?;

        // Best-effort cleanup; a leftover tarball is harmless.
        if let Err(e) = fs::remove_file(&tarball_path) {
            warn!(
                "Failed to remove tarball {}: {}",
                tarball_path.display(),
                e
            );
        }

        dirs.write_config(&target_dir, &entry.config)?;

        self.run_install_hook(name, &target_dir).await?;

        progress
            .send(InstallEvent::Installed {
                analyser: name.to_string(),
                version: version.to_string(),
            })
            .await;

        info!("Installed {}@{}", name, version);
        Ok(entry.config.clone())
    }

    async fn download_tarball(&self, url: &str, dest: &Path) -> Result<u64> {
        debug!("Downloading tarball from {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AnalyserError::Download {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalyserError::Download {
                url: url.to_string(),
                message: format!("server returned {}", status),
            });
        }

        let mut file =
            File::create(dest).map_err(|e| AnalyserError::io_with_path(e, dest))?;

        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| AnalyserError::Download {
                url: url.to_string(),
                message: format!("error reading download chunk: {}", e),
            })?;
            file.write_all(&chunk)
                .map_err(|e| AnalyserError::io_with_path(e, dest))?;
            downloaded += chunk.len() as u64;
        }

        debug!("Download complete: {} bytes", downloaded);
        Ok(downloaded)
    }

    /// Run the plugin's post-install hook from within its directory.
    ///
    /// A missing hook script is fine; a spawn failure or non-zero exit
    /// is `InstallHook` and the partial install stays on disk.
    async fn run_install_hook(&self, plugin: &str, dir: &Path) -> Result<()> {
        let script = dir.join(platform::hook_script_name());
        if !script.exists() {
            debug!(
                "No {} in {}, skipping install hook",
                platform::hook_script_name(),
                dir.display()
            );
            return Ok(());
        }

        let (program, args) = platform::hook_invocation();
        debug!("Running install hook for {} in {}", plugin, dir.display());

        let output = tokio::process::Command::new(program)
            .args(args)
            .current_dir(dir)
            .output()
            .await
            .map_err(|e| AnalyserError::InstallHook {
                plugin: plugin.to_string(),
                message: format!("failed to spawn {}: {}", program, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnalyserError::InstallHook {
                plugin: plugin.to_string(),
                message: format!("hook exited with {}: {}", output.status, stderr.trim()),
            });
        }

        Ok(())
    }
}

/// Extract a gzipped tarball into a directory, stripping the top-level
/// wrapper folder (npm tarballs wrap everything in `package/`).
pub(crate) fn extract_tarball(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let file =
        File::open(archive_path).map_err(|e| AnalyserError::io_with_path(e, archive_path))?;
    let decoder = GzDecoder::new(BufReader::new(file));
    let mut archive = tar::Archive::new(decoder);

    let entries = archive
        .entries()
        .map_err(|e| AnalyserError::io_with_path(e, archive_path))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| AnalyserError::io_with_path(e, archive_path))?;
        let path = entry
            .path()
            .map_err(|e| AnalyserError::io_with_path(e, archive_path))?
            .into_owned();

        let stripped: PathBuf = path.components().skip(1).collect();
        if stripped.as_os_str().is_empty() {
            continue;
        }
        // Anything but plain path segments (`..`, a root, a prefix)
        // could land outside the install directory.
        if stripped
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            warn!("Skipping tarball entry with unsafe path {}", path.display());
            continue;
        }

        let out_path = dest_dir.join(&stripped);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AnalyserError::io_with_path(e, parent.to_path_buf()))?;
        }
        entry
            .unpack(&out_path)
            .map_err(|e| AnalyserError::io_with_path(e, out_path))?;
    }

    Ok(())
}
