//! Analyser Core - registry access, version resolution and shared types.
//!
//! This crate provides the pieces of the analyser install workflow that
//! never touch the install directory: the central plugin list and
//! package registry clients, semantic-version resolution, the shared
//! data model, and error types.
//!
//! For the install directory layout, the archive installer and the
//! public orchestrator, see the `analyser-manager` crate.

pub mod config;
pub mod error;
pub mod jsonc;
pub mod models;
pub mod platform;
pub mod registry;
pub mod resolver;

// Re-export commonly used types
pub use error::{AnalyserError, Result};
pub use models::{
    AnalyserRef, DistInfo, InstallRequest, InstalledAnalyser, LanguageTools, PackageInfo,
    PackageVersion, PluginConfig, PluginRef, Registry, RegistryEntry, RepoConfig, VersionCheck,
};
pub use registry::RegistryClient;
