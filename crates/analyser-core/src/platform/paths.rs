//! Platform-specific path and command helpers.

use crate::config::PathsConfig;
use crate::error::{AnalyserError, Result};
use std::path::PathBuf;

/// Get the conventional default install root.
///
/// # Platform Behavior
/// - **Linux**: `~/.cache/analysers` (XDG_CACHE_HOME)
/// - **Windows**: `%LOCALAPPDATA%\analysers`
/// - **macOS**: `~/Library/Caches/analysers`
///
/// The orchestrator takes an explicit root; this is the default a caller
/// can pass when it has no opinion of its own.
pub fn default_install_root() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir().ok_or_else(|| AnalyserError::Config {
        message: "Could not determine platform cache directory".to_string(),
    })?;
    Ok(cache_dir.join(PathsConfig::INSTALL_ROOT_DIR_NAME))
}

/// Get the name of the post-install hook script on the current platform.
pub fn hook_script_name() -> &'static str {
    #[cfg(unix)]
    {
        PathsConfig::HOOK_SCRIPT_UNIX
    }
    #[cfg(windows)]
    {
        PathsConfig::HOOK_SCRIPT_WINDOWS
    }
}

/// Get the OS-appropriate command form for the install hook.
///
/// # Platform Behavior
/// - **Linux/macOS**: `sh install.sh`
/// - **Windows**: `cmd /C install.bat`
pub fn hook_invocation() -> (&'static str, &'static [&'static str]) {
    #[cfg(unix)]
    {
        ("sh", &[PathsConfig::HOOK_SCRIPT_UNIX])
    }
    #[cfg(windows)]
    {
        ("cmd", &["/C", PathsConfig::HOOK_SCRIPT_WINDOWS])
    }
}
