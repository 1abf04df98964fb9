//! Centralized configuration constants for the analyser workspace.

use std::time::Duration;

/// Registry endpoints.
pub struct RegistryConfig;

impl RegistryConfig {
    /// Central list of known analyser plugins and their wrapper config.
    pub const PLUGIN_LIST_URL: &'static str =
        "https://registry.analysers.dev/analysers.json";
    /// Package registry hosting the installable tarballs.
    pub const NPM_REGISTRY_BASE: &'static str = "https://registry.npmjs.org";
    /// Dist tag resolved when no concrete version is requested.
    pub const LATEST_TAG: &'static str = "latest";
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
    // Tarball downloads get a connect timeout only; large archives can
    // legitimately take longer than any fixed overall timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
    pub const USER_AGENT: &'static str = "analyser-manager/0.1";
}

/// Shared directory and file name configuration.
pub struct PathsConfig;

impl PathsConfig {
    /// Directory name under the platform cache dir used as the default
    /// install root.
    pub const INSTALL_ROOT_DIR_NAME: &'static str = "analysers";
    /// Wrapper config materialized inside every install directory.
    pub const CONFIG_FILENAME: &'static str = "config.json";
    /// Separator between plugin name and version in directory names.
    pub const VERSION_SEPARATOR: char = '@';
    /// Post-install hook script names, run from the extracted directory.
    pub const HOOK_SCRIPT_UNIX: &'static str = "install.sh";
    pub const HOOK_SCRIPT_WINDOWS: &'static str = "install.bat";
}
