//! Error types for vendoring operations.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Filesystem step that failed while preparing or cleaning a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOperation {
    /// Removing a previous copy of the target directory.
    Remove,
    /// Creating the fresh target directory.
    Create,
    /// Removing the `.git` / `.hg` directory after the clone.
    StripMetadata,
}

impl fmt::Display for FsOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Remove => "remove",
            Self::Create => "create",
            Self::StripMetadata => "strip metadata from",
        };
        f.write_str(label)
    }
}

/// Errors raised while vendoring a single dependency.
#[derive(Debug, Error)]
pub enum VendorError {
    #[error("`{command}` failed{}", exit_suffix(.exit_code, .stderr))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to {operation} {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        operation: FsOperation,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported version control kind: {0:?} (expected \"git\" or \"hg\")")]
    UnsupportedKind(String),

    #[error("Invalid dependency name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Invalid revision {reference:?}: {reason}")]
    InvalidReference {
        reference: String,
        reason: &'static str,
    },

    #[error("Invalid clone URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl VendorError {
    /// Exit code of the failing external command, if this error came from one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::CommandFailed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}

fn exit_suffix(exit_code: &Option<i32>, stderr: &str) -> String {
    let mut suffix = match exit_code {
        Some(code) => format!(" with exit code {}", code),
        None => " (terminated by signal)".to_string(),
    };
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        suffix.push_str(": ");
        suffix.push_str(stderr);
    }
    suffix
}

/// Result alias for vendoring operations.
pub type Result<T> = std::result::Result<T, VendorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_message_includes_exit_code_and_stderr() {
        let err = VendorError::CommandFailed {
            command: "git reset --quiet --hard deadbeef".to_string(),
            exit_code: Some(128),
            stderr: "fatal: ambiguous argument 'deadbeef'\n".to_string(),
        };

        let message = err.to_string();
        assert!(message.contains("git reset --quiet --hard deadbeef"));
        assert!(message.contains("exit code 128"));
        assert!(message.ends_with("fatal: ambiguous argument 'deadbeef'"));
        assert_eq!(err.exit_code(), Some(128));
    }

    #[test]
    fn signal_termination_has_no_exit_code() {
        let err = VendorError::CommandFailed {
            command: "hg clone".to_string(),
            exit_code: None,
            stderr: String::new(),
        };

        assert_eq!(err.to_string(), "`hg clone` failed (terminated by signal)");
        assert_eq!(err.exit_code(), None);
    }

    #[test]
    fn filesystem_message_names_operation_and_path() {
        let err = VendorError::Filesystem {
            path: PathBuf::from("/vendor/src/example.com/dep/.git"),
            operation: FsOperation::StripMetadata,
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };

        let message = err.to_string();
        assert!(
            message.starts_with("Failed to strip metadata from /vendor/src/example.com/dep/.git")
        );
    }
}
