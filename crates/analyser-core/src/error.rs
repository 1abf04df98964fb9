//! Error types for the analyser install workspace.
//!
//! Every failure mode of the install pipeline maps to exactly one variant
//! here so callers can distinguish remote failures (registry, download)
//! from local ones (install root, corrupt config, hook script).

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for analyser operations.
#[derive(Debug, Error)]
pub enum AnalyserError {
    // Registry / network errors
    #[error("Registry unavailable: {message}")]
    RegistryUnavailable {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Unknown plugin: {name}")]
    UnknownPlugin { name: String },

    #[error("Version {version} not found for {name}")]
    VersionNotFound { name: String, version: String },

    #[error("Invalid semantic version: {version}")]
    InvalidVersion {
        version: String,
        #[source]
        source: Option<semver::Error>,
    },

    #[error("Download failed for {url}: {message}")]
    Download { url: String, message: String },

    // Install root errors (fatal at initialization)
    #[error("Failed to create install root {path}")]
    RootCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Install root is not writable: {path}")]
    RootUnwritable { path: PathBuf },

    #[error("Failed to create directory {path}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Installed plugin errors (terminal per-call, other installs unaffected)
    #[error("Failed to read config at {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Install hook failed for {plugin}: {message}")]
    InstallHook { plugin: String, message: String },

    #[error("Analyser {name}@{version} is not installed")]
    AnalyserFetch { name: String, version: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Ambient errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

/// Result type alias for analyser operations.
pub type Result<T> = std::result::Result<T, AnalyserError>;

impl From<std::io::Error> for AnalyserError {
    fn from(err: std::io::Error) -> Self {
        AnalyserError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for AnalyserError {
    fn from(err: serde_json::Error) -> Self {
        AnalyserError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl AnalyserError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        AnalyserError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Check if this error could succeed on a retry. Nothing retries
    /// automatically; the whole operation must be re-invoked by the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AnalyserError::RegistryUnavailable { .. } | AnalyserError::Download { .. }
        )
    }
}
