//! Manifest schema definitions.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::fetch::FetcherConfig;
use crate::spec::{VcsKind, VendorSpec};

use super::ManifestError;

/// Contents of a `vendor.toml` manifest.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub settings: Settings,

    /// Declared dependencies, in the order they are vendored.
    #[serde(default, rename = "package", skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<VendorSpec>,
}

/// Fetcher settings shared by every declared package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Settings {
    /// Relative paths are resolved against the manifest's directory.
    pub vendor_root: PathBuf,
    pub url_prefix: String,
    pub git: PathBuf,
    pub hg: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vendor_root: PathBuf::from("vendor"),
            url_prefix: FetcherConfig::DEFAULT_URL_PREFIX.to_string(),
            git: PathBuf::from(VcsKind::Git.program()),
            hg: PathBuf::from(VcsKind::Hg.program()),
        }
    }
}

impl Manifest {
    /// Check every package and reject names that would share a directory.
    pub fn validate(&self) -> Result<(), ManifestError> {
        let mut seen = HashSet::new();
        for package in &self.packages {
            package.validate()?;
            if !seen.insert(package.name.as_str()) {
                return Err(ManifestError::DuplicateName(package.name.clone()));
            }
        }

        for outer in &self.packages {
            for inner in &self.packages {
                if contains_path(&outer.name, &inner.name) {
                    return Err(ManifestError::OverlappingNames {
                        outer: outer.name.clone(),
                        inner: inner.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Fetcher configuration, resolving a relative vendor root against `base_dir`.
    pub fn fetcher_config(&self, base_dir: &Path) -> FetcherConfig {
        let vendor_root = if self.settings.vendor_root.is_absolute() {
            self.settings.vendor_root.clone()
        } else {
            base_dir.join(&self.settings.vendor_root)
        };

        FetcherConfig::new(vendor_root)
            .with_url_prefix(self.settings.url_prefix.clone())
            .with_git_program(self.settings.git.clone())
            .with_hg_program(self.settings.hg.clone())
    }

    pub fn find(&self, name: &str) -> Option<&VendorSpec> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Packages matching `names`, in declaration order.
    ///
    /// An empty selection means every package.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&VendorSpec>, ManifestError> {
        if names.is_empty() {
            return Ok(self.packages.iter().collect());
        }

        for name in names {
            if self.find(name.as_ref()).is_none() {
                return Err(ManifestError::UnknownPackage(name.as_ref().to_string()));
            }
        }

        Ok(self
            .packages
            .iter()
            .filter(|p| names.iter().any(|n| n.as_ref() == p.name))
            .collect())
    }
}

/// Whether `inner` lives strictly below `outer`, compared by whole segments.
fn contains_path(outer: &str, inner: &str) -> bool {
    inner
        .strip_prefix(outer)
        .is_some_and(|rest| rest.starts_with('/'))
}
