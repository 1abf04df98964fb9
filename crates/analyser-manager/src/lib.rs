//! Analyser Manager - local installation of analyser plugins.
//!
//! The [`AnalyserManager`] orchestrator ties together the registry
//! client and version resolver from `analyser-core` with this crate's
//! install directory layout and archive installer. Installs report
//! progress over an mpsc channel obtained from
//! [`AnalyserManager::event_stream`].

pub mod install_dir;
pub mod installer;
pub mod manager;
pub mod progress;

pub use install_dir::InstallDirManager;
pub use installer::ArchiveInstaller;
pub use manager::AnalyserManager;
pub use progress::{InstallEvent, InstallStage, ProgressSender};

// Shared types from the core crate that callers need alongside the
// manager.
pub use analyser_core::{
    AnalyserError, AnalyserRef, InstallRequest, InstalledAnalyser, PluginConfig, RegistryClient,
    RegistryEntry, RepoConfig, Result, VersionCheck,
};
