//! Vendor fetcher: one pinned snapshot per call.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{FsOperation, Result, VendorError};
use crate::spec::{VcsKind, VendorSpec};

use super::command::{CommandRole, plan};
use super::report::{FailurePolicy, FetchFailure, VendorReport};
use super::FetcherConfig;

/// Progress of a single fetch. A failure leaves the last stage reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStage {
    Start,
    PathCleared,
    Cloned,
    Pinned,
    MetadataStripped,
    Done,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Start => "start",
            Self::PathCleared => "path cleared",
            Self::Cloned => "cloned",
            Self::Pinned => "pinned",
            Self::MetadataStripped => "metadata stripped",
            Self::Done => "done",
        };
        f.write_str(label)
    }
}

/// A successfully vendored dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchOutcome {
    pub name: String,
    pub kind: VcsKind,
    pub reference: String,
    pub target_dir: PathBuf,
}

/// Materialises pinned dependency snapshots under a vendor root.
#[derive(Debug, Clone)]
pub struct VendorFetcher {
    config: FetcherConfig,
}

impl VendorFetcher {
    pub fn new(config: FetcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Replace `<vendor_root>/src/<name>` with a metadata-free snapshot of
    /// `spec` at its pinned revision.
    ///
    /// The first failing step aborts the fetch. Nothing is rolled back; the
    /// next fetch of the same spec starts by deleting whatever was left.
    pub fn fetch(&self, spec: &VendorSpec) -> Result<FetchOutcome> {
        let mut stage = FetchStage::Start;
        self.fetch_tracked(spec, &mut stage)
    }

    /// Fetch every spec in order, collecting the outcome of each.
    pub fn fetch_all<'a, I>(&self, specs: I, policy: FailurePolicy) -> VendorReport
    where
        I: IntoIterator<Item = &'a VendorSpec>,
    {
        let mut report = VendorReport::default();
        let mut specs = specs.into_iter();

        for spec in specs.by_ref() {
            let mut stage = FetchStage::Start;
            match self.fetch_tracked(spec, &mut stage) {
                Ok(outcome) => report.succeeded.push(outcome),
                Err(error) => {
                    warn!(dependency = %spec.name, %stage, "vendoring failed: {}", error);
                    report.failed.push(FetchFailure {
                        name: spec.name.clone(),
                        stage,
                        error,
                    });
                    if policy == FailurePolicy::FailFast {
                        break;
                    }
                }
            }
        }

        report.skipped = specs.map(|spec| spec.name.clone()).collect();
        report
    }

    fn fetch_tracked(&self, spec: &VendorSpec, stage: &mut FetchStage) -> Result<FetchOutcome> {
        let commands = plan(spec, &self.config)?;
        let target = spec.target_dir(&self.config.vendor_root);

        info!(dependency = %spec.name, kind = %spec.kind, reference = %spec.reference, "vendoring");

        clear_dir(&target)?;
        advance(stage, FetchStage::PathCleared, spec);

        for command in &commands {
            command.run()?;
            match command.role {
                CommandRole::Clone => advance(stage, FetchStage::Cloned, spec),
                CommandRole::Pin => advance(stage, FetchStage::Pinned, spec),
                CommandRole::CloneAtRevision => {
                    advance(stage, FetchStage::Cloned, spec);
                    advance(stage, FetchStage::Pinned, spec);
                }
            }
        }

        strip_metadata(&target, spec.kind)?;
        advance(stage, FetchStage::MetadataStripped, spec);

        advance(stage, FetchStage::Done, spec);
        info!(dependency = %spec.name, target = %target.display(), "vendored");

        Ok(FetchOutcome {
            name: spec.name.clone(),
            kind: spec.kind,
            reference: spec.reference.clone(),
            target_dir: target,
        })
    }
}

/// Fetch a single spec into `vendor_root` using default client settings.
pub fn fetch(spec: &VendorSpec, vendor_root: &Path) -> Result<FetchOutcome> {
    VendorFetcher::new(FetcherConfig::new(vendor_root)).fetch(spec)
}

fn advance(stage: &mut FetchStage, next: FetchStage, spec: &VendorSpec) {
    debug!(dependency = %spec.name, from = %stage, to = %next, "stage");
    *stage = next;
}

/// Remove any previous copy of `target` and recreate it empty.
fn clear_dir(target: &Path) -> Result<()> {
    match std::fs::remove_dir_all(target) {
        Ok(()) => debug!(path = %target.display(), "removed previous snapshot"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(VendorError::Filesystem {
                path: target.to_path_buf(),
                operation: FsOperation::Remove,
                source,
            });
        }
    }

    std::fs::create_dir_all(target).map_err(|source| VendorError::Filesystem {
        path: target.to_path_buf(),
        operation: FsOperation::Create,
        source,
    })
}

fn strip_metadata(target: &Path, kind: VcsKind) -> Result<()> {
    let metadata = target.join(kind.metadata_dir());
    std::fs::remove_dir_all(&metadata).map_err(|source| VendorError::Filesystem {
        path: metadata,
        operation: FsOperation::StripMetadata,
        source,
    })
}
