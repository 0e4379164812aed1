//! Vendor manifest (`vendor.toml`).
//!
//! The manifest is the static list of pinned dependencies together with the
//! fetcher settings. A default manifest is compiled in so the tool works
//! without any file on disk.

mod parser;
mod schema;

pub use parser::{parse_manifest, parse_manifest_str, to_toml};
pub use schema::{Manifest, Settings};

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::VendorError;

/// Default manifest file name, looked up in the working directory.
pub const MANIFEST_FILE: &str = "vendor.toml";

const BUILTIN_MANIFEST: &str = include_str!("builtin.toml");

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error(transparent)]
    Invalid(#[from] VendorError),

    #[error("Package {0:?} is declared more than once")]
    DuplicateName(String),

    #[error("Package {inner:?} is nested inside package {outer:?}")]
    OverlappingNames { outer: String, inner: String },

    #[error("Package {0:?} is not declared in the manifest")]
    UnknownPackage(String),
}

impl Manifest {
    /// The manifest shipped with the binary.
    pub fn builtin() -> Result<Self, ManifestError> {
        parse_manifest_str(BUILTIN_MANIFEST)
    }

    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        parse_manifest(path)
    }

    pub fn parse_str(content: &str) -> Result<Self, ManifestError> {
        parse_manifest_str(content)
    }
}
