//! HTTP client for the central plugin list and the package registry.
//!
//! Two-tier separation: the central list vets which plugin names are
//! known to the product; the package registry (npm-style) provides the
//! per-version tarball metadata actually needed to install. The client
//! is stateless; the plugin-list cache lives in the orchestrator.

use crate::config::{NetworkConfig, RegistryConfig};
use crate::error::{AnalyserError, Result};
use crate::jsonc;
use crate::models::{PackageInfo, RegistryEntry};
use std::collections::HashMap;
use tracing::{debug, info};

/// Client for the central plugin list and the backing package registry.
pub struct RegistryClient {
    http: reqwest::Client,
    list_url: String,
    package_base: String,
}

impl RegistryClient {
    /// Create a client against the default endpoints.
    pub fn new() -> Result<Self> {
        Self::with_endpoints(
            RegistryConfig::PLUGIN_LIST_URL,
            RegistryConfig::NPM_REGISTRY_BASE,
        )
    }

    /// Create a client against custom endpoints.
    pub fn with_endpoints(
        list_url: impl Into<String>,
        package_base: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(NetworkConfig::CONNECT_TIMEOUT)
            .timeout(NetworkConfig::REQUEST_TIMEOUT)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| AnalyserError::Config {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        let package_base: String = package_base.into();
        Ok(Self {
            http,
            list_url: list_url.into(),
            package_base: package_base.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the canonical list of known plugins, keyed by name.
    ///
    /// A failed fetch always rejects; this never returns a partial map.
    pub async fn fetch_plugin_list(&self) -> Result<HashMap<String, RegistryEntry>> {
        debug!("Fetching plugin list from {}", self.list_url);
        let body = self.get_text(&self.list_url).await?;

        let mut entries: HashMap<String, RegistryEntry> =
            jsonc::from_str(&body).map_err(|e| AnalyserError::RegistryUnavailable {
                message: format!("Malformed plugin list: {}", e),
                source: None,
            })?;

        // The list is a name-keyed object; entries carry their own name
        // from here on.
        for (name, entry) in entries.iter_mut() {
            entry.name = name.clone();
        }

        info!("Fetched {} plugins from registry", entries.len());
        Ok(entries)
    }

    /// Fetch installable version metadata for one plugin from the
    /// package registry.
    pub async fn fetch_package_info(&self, name: &str) -> Result<PackageInfo> {
        let url = format!("{}/{}", self.package_base, name);
        debug!("Fetching package metadata from {}", url);
        let body = self.get_text(&url).await?;

        jsonc::from_str(&body).map_err(|e| AnalyserError::RegistryUnavailable {
            message: format!("Malformed package metadata for {}: {}", name, e),
            source: None,
        })
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response =
            self.http
                .get(url)
                .send()
                .await
                .map_err(|e| AnalyserError::RegistryUnavailable {
                    message: format!("GET {} failed: {}", url, e),
                    source: Some(e),
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalyserError::RegistryUnavailable {
                message: format!("GET {} returned {}", url, status),
                source: None,
            });
        }

        response
            .text()
            .await
            .map_err(|e| AnalyserError::RegistryUnavailable {
                message: format!("Failed to read response body from {}: {}", url, e),
                source: Some(e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Registry;

    const LIST_BODY: &str = r#"{
        // known analyser plugins
        "eslint": {
            "registry": "npm",
            "config": {"version": "1.2.3", "shortName": "eslint"}
        },
        "pylint": {
            "registry": "npm",
            "config": {"version": "0.4.0"}
        }
    }"#;

    #[tokio::test]
    async fn test_fetch_plugin_list_injects_names() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/analysers.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(LIST_BODY)
            .create_async()
            .await;

        let client = RegistryClient::with_endpoints(
            format!("{}/analysers.json", server.url()),
            server.url(),
        )
        .unwrap();

        let list = client.fetch_plugin_list().await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list["eslint"].name, "eslint");
        assert_eq!(list["eslint"].registry, Registry::Npm);
        assert_eq!(list["pylint"].config.version.as_deref(), Some("0.4.0"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_plugin_list_rejects_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/analysers.json")
            .with_status(503)
            .create_async()
            .await;

        let client = RegistryClient::with_endpoints(
            format!("{}/analysers.json", server.url()),
            server.url(),
        )
        .unwrap();

        let err = client.fetch_plugin_list().await.unwrap_err();
        assert!(matches!(err, AnalyserError::RegistryUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_fetch_plugin_list_rejects_malformed_json() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/analysers.json")
            .with_status(200)
            .with_body("{ definitely not json ]")
            .create_async()
            .await;

        let client = RegistryClient::with_endpoints(
            format!("{}/analysers.json", server.url()),
            server.url(),
        )
        .unwrap();

        let err = client.fetch_plugin_list().await.unwrap_err();
        assert!(matches!(err, AnalyserError::RegistryUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_fetch_package_info() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/eslint")
            .with_status(200)
            .with_body(
                r#"{
                    "dist-tags": {"latest": "1.2.3"},
                    "versions": {
                        "1.2.3": {"dist": {"tarball": "https://example.com/eslint-1.2.3.tgz"}}
                    }
                }"#,
            )
            .create_async()
            .await;

        let client = RegistryClient::with_endpoints(
            format!("{}/analysers.json", server.url()),
            server.url(),
        )
        .unwrap();

        let info = client.fetch_package_info("eslint").await.unwrap();
        assert_eq!(info.dist_tags["latest"], "1.2.3");
        assert_eq!(
            info.versions["1.2.3"].dist.tarball,
            "https://example.com/eslint-1.2.3.tgz"
        );
    }
}
