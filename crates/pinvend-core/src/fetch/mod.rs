//! Fetching pinned snapshots into the vendor tree.
//!
//! A fetch is a fixed pipeline per dependency:
//! clear the target directory, clone, pin the revision, strip the
//! version control metadata.

mod command;
mod fetcher;
mod report;

pub use command::{CommandRole, PlannedCommand, plan};
pub use fetcher::{FetchOutcome, FetchStage, VendorFetcher, fetch};
pub use report::{FailurePolicy, FetchFailure, VendorReport};

use std::path::PathBuf;

use crate::spec::VcsKind;

/// Settings shared by every fetch in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Root of the vendor tree; snapshots land in `<vendor_root>/src/<name>`.
    pub vendor_root: PathBuf,
    pub git_program: PathBuf,
    pub hg_program: PathBuf,
    /// Prepended to each dependency name to form the clone address.
    pub url_prefix: String,
}

impl FetcherConfig {
    pub const DEFAULT_URL_PREFIX: &'static str = "https://";

    pub fn new(vendor_root: impl Into<PathBuf>) -> Self {
        Self {
            vendor_root: vendor_root.into(),
            git_program: PathBuf::from(VcsKind::Git.program()),
            hg_program: PathBuf::from(VcsKind::Hg.program()),
            url_prefix: Self::DEFAULT_URL_PREFIX.to_string(),
        }
    }

    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into();
        self
    }

    pub fn with_git_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.git_program = program.into();
        self
    }

    pub fn with_hg_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.hg_program = program.into();
        self
    }
}
