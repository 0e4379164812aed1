//! Vendored dependency declarations.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VendorError};

/// Version control system used to fetch a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VcsKind {
    Git,
    Hg,
}

impl VcsKind {
    /// Default client binary for this kind.
    pub fn program(&self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Hg => "hg",
        }
    }

    /// Metadata directory the client leaves behind in a checkout.
    pub fn metadata_dir(&self) -> &'static str {
        match self {
            Self::Git => ".git",
            Self::Hg => ".hg",
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.program()
    }
}

impl fmt::Display for VcsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for VcsKind {
    type Err = VendorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "git" => Ok(Self::Git),
            "hg" | "mercurial" => Ok(Self::Hg),
            _ => Err(VendorError::UnsupportedKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for VcsKind {
    type Error = VendorError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<VcsKind> for String {
    fn from(kind: VcsKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A single pinned dependency: which client, where it lives, and at what revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VendorSpec {
    pub kind: VcsKind,
    /// Slash-separated identifier, e.g. `github.com/coreos/go-etcd`.
    ///
    /// Used both as the path under `<vendor_root>/src/` and as the clone
    /// address once prefixed with the configured URL scheme.
    pub name: String,
    /// Commit hash, tag, or branch understood by the selected client.
    #[serde(rename = "ref")]
    pub reference: String,
}

impl VendorSpec {
    /// Create a validated spec.
    pub fn new(
        kind: VcsKind,
        name: impl Into<String>,
        reference: impl Into<String>,
    ) -> Result<Self> {
        let spec = Self {
            kind,
            name: name.into(),
            reference: reference.into(),
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Shorthand for a git dependency.
    pub fn git(name: impl Into<String>, reference: impl Into<String>) -> Result<Self> {
        Self::new(VcsKind::Git, name, reference)
    }

    /// Shorthand for a mercurial dependency.
    pub fn hg(name: impl Into<String>, reference: impl Into<String>) -> Result<Self> {
        Self::new(VcsKind::Hg, name, reference)
    }

    /// Check the name and revision invariants.
    ///
    /// The name must stay inside the vendor root and neither value may be
    /// mistaken for a command-line flag by the client.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_reference(&self.reference)
    }

    /// Directory the snapshot is materialised into.
    pub fn target_dir(&self, vendor_root: &Path) -> PathBuf {
        self.name
            .split('/')
            .fold(vendor_root.join("src"), |path, segment| path.join(segment))
    }

    /// Clone source formed by prefixing the name with `url_prefix`.
    pub fn clone_url(&self, url_prefix: &str) -> Result<url::Url> {
        let raw = format!("{}{}", url_prefix, self.name);
        url::Url::parse(&raw).map_err(|source| VendorError::InvalidUrl { url: raw, source })
    }
}

impl fmt::Display for VendorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}@{}", self.kind, self.name, self.reference)
    }
}

fn validate_name(name: &str) -> Result<()> {
    let invalid = |reason| {
        Err(VendorError::InvalidName {
            name: name.to_string(),
            reason,
        })
    };

    if name.is_empty() {
        return invalid("name is empty");
    }
    if name.starts_with('/') {
        return invalid("name must be relative");
    }
    if name.contains('\\') || name.contains('\0') {
        return invalid("name contains a backslash or NUL byte");
    }
    if name.chars().any(|c| matches!(c, '%' | '?' | '#' | '@')) {
        return invalid("name must not contain `%`, `?`, `#` or `@`");
    }
    for (index, segment) in name.split('/').enumerate() {
        match segment {
            "" => return invalid("name contains an empty path segment"),
            "." | ".." => return invalid("name must not contain `.` or `..` segments"),
            s if s.starts_with('-') => return invalid("path segments must not start with `-`"),
            s if s.chars().any(char::is_whitespace) => {
                return invalid("name must not contain whitespace");
            }
            // A port is only meaningful on the host.
            s if index > 0 && s.contains(':') => {
                return invalid("`:` is only allowed in the first segment");
            }
            _ => {}
        }
    }
    Ok(())
}

fn validate_reference(reference: &str) -> Result<()> {
    let invalid = |reason| {
        Err(VendorError::InvalidReference {
            reference: reference.to_string(),
            reason,
        })
    };

    if reference.is_empty() {
        return invalid("revision is required");
    }
    if reference.starts_with('-') {
        return invalid("revision must not start with `-`");
    }
    if reference.chars().any(|c| c.is_whitespace() || c == '\0') {
        return invalid("revision must not contain whitespace or NUL bytes");
    }
    Ok(())
}
