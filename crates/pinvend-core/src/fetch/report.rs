//! Outcome of a batch of fetches.

use crate::error::VendorError;

use super::{FetchOutcome, FetchStage};

/// What to do with the remaining specs once one fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Keep going and report every failure at the end.
    #[default]
    Continue,
    /// Stop at the first failure; the rest are reported as skipped.
    FailFast,
}

/// A dependency that could not be vendored.
#[derive(Debug)]
pub struct FetchFailure {
    pub name: String,
    /// Last stage completed before the error.
    pub stage: FetchStage,
    pub error: VendorError,
}

#[derive(Debug, Default)]
pub struct VendorReport {
    pub succeeded: Vec<FetchOutcome>,
    pub failed: Vec<FetchFailure>,
    /// Specs never attempted because of [`FailurePolicy::FailFast`].
    pub skipped: Vec<String>,
}

impl VendorReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.skipped.len()
    }
}
