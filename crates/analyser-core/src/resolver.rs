//! Version resolution against package registry metadata.
//!
//! Resolution is pure: network access stays in the registry client and
//! the orchestrator. "latest" expands to the registry's dist tag; a
//! concrete request must exist among the published versions.

use crate::config::RegistryConfig;
use crate::error::{AnalyserError, Result};
use crate::models::{PackageInfo, VersionCheck};
use semver::Version;

/// Resolve a requested version against package metadata.
///
/// `None` and the literal `"latest"` expand to the `latest` dist tag.
/// Anything else is returned unchanged, but only after confirming the
/// package registry actually publishes it.
pub fn resolve(name: &str, requested: Option<&str>, info: &PackageInfo) -> Result<String> {
    match requested {
        None | Some(RegistryConfig::LATEST_TAG) => info
            .dist_tags
            .get(RegistryConfig::LATEST_TAG)
            .cloned()
            .ok_or_else(|| AnalyserError::VersionNotFound {
                name: name.to_string(),
                version: RegistryConfig::LATEST_TAG.to_string(),
            }),
        Some(version) => {
            if info.versions.contains_key(version) {
                Ok(version.to_string())
            } else {
                Err(AnalyserError::VersionNotFound {
                    name: name.to_string(),
                    version: version.to_string(),
                })
            }
        }
    }
}

/// Compare an installed version against the resolved latest one.
///
/// `latest` must be valid semver. A current version that does not parse
/// is tolerated: the check still reports `latest`, just without a
/// `newer` verdict. Equality is not newer (strict less-than).
pub fn check_newer(current: Option<&str>, latest: &str) -> Result<VersionCheck> {
    let latest_version =
        Version::parse(latest).map_err(|e| AnalyserError::InvalidVersion {
            version: latest.to_string(),
            source: Some(e),
        })?;

    let newer = current
        .and_then(|c| Version::parse(c).ok())
        .map(|c| c < latest_version);

    Ok(VersionCheck {
        newer,
        latest: latest.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DistInfo, PackageVersion};
    use std::collections::HashMap;

    fn package_info(latest: &str, versions: &[&str]) -> PackageInfo {
        PackageInfo {
            dist_tags: HashMap::from([("latest".to_string(), latest.to_string())]),
            versions: versions
                .iter()
                .map(|v| {
                    (
                        v.to_string(),
                        PackageVersion {
                            dist: DistInfo {
                                tarball: format!(
                                    "https://registry.npmjs.org/a/-/a-{}.tgz",
                                    v
                                ),
                            },
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn test_resolve_latest_expands_dist_tag() {
        let info = package_info("2.1.0", &["2.0.0", "2.1.0"]);
        assert_eq!(resolve("eslint", None, &info).unwrap(), "2.1.0");
        assert_eq!(resolve("eslint", Some("latest"), &info).unwrap(), "2.1.0");
    }

    #[test]
    fn test_resolve_concrete_version_must_be_published() {
        let info = package_info("2.1.0", &["2.0.0", "2.1.0"]);
        assert_eq!(resolve("eslint", Some("2.0.0"), &info).unwrap(), "2.0.0");

        let err = resolve("eslint", Some("9.9.9"), &info).unwrap_err();
        assert!(matches!(
            err,
            AnalyserError::VersionNotFound { ref version, .. } if version == "9.9.9"
        ));
    }

    #[test]
    fn test_resolve_missing_latest_tag_fails() {
        let info = PackageInfo::default();
        let err = resolve("eslint", None, &info).unwrap_err();
        assert!(matches!(err, AnalyserError::VersionNotFound { .. }));
    }

    #[test]
    fn test_check_newer_strict_less_than() {
        let check = check_newer(Some("0.0.1"), "1.0.0").unwrap();
        assert_eq!(check.newer, Some(true));
        assert_eq!(check.latest, "1.0.0");

        let check = check_newer(Some("1.0.0"), "1.0.0").unwrap();
        assert_eq!(check.newer, Some(false), "equality is not newer");

        let check = check_newer(Some("2.0.0"), "1.0.0").unwrap();
        assert_eq!(check.newer, Some(false));
    }

    #[test]
    fn test_check_newer_tolerates_garbage_current() {
        let check = check_newer(Some("garbage"), "1.0.0").unwrap();
        assert_eq!(check.newer, None);
        assert_eq!(check.latest, "1.0.0");

        let check = check_newer(None, "1.0.0").unwrap();
        assert_eq!(check.newer, None);
    }

    #[test]
    fn test_check_newer_rejects_invalid_latest() {
        let err = check_newer(Some("1.0.0"), "not-a-version").unwrap_err();
        assert!(matches!(
            err,
            AnalyserError::InvalidVersion { ref version, .. } if version == "not-a-version"
        ));
    }
}
