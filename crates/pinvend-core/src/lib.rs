//! Pinvend Core Library
//!
//! Vendors third-party sources at pinned revisions by driving the `git` and
//! `hg` clients, leaving metadata-free snapshots under `<vendor_root>/src/`.

pub mod error;
pub mod fetch;
pub mod manifest;
pub mod spec;

/// Re-exports of commonly used types
pub mod prelude {
    pub use crate::error::{FsOperation, VendorError};

    pub use crate::spec::{VcsKind, VendorSpec};

    pub use crate::fetch::{
        FailurePolicy, FetchFailure, FetchOutcome, FetchStage, FetcherConfig, PlannedCommand,
        VendorFetcher, VendorReport,
    };

    pub use crate::manifest::{MANIFEST_FILE, Manifest, ManifestError};
}
