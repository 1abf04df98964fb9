//! Registry access: the central plugin list and per-package metadata.

mod client;

pub use client::RegistryClient;
