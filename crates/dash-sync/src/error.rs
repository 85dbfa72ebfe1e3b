use dash_store::StoreError;
use thiserror::Error;

use crate::progress::BatchProgress;

/// A batch that had at least one failed operation.
///
/// `path` and `source` name the first failure. Operations that were still in
/// flight at that moment were awaited and their outcomes are in `progress`.
/// Assets written before the failure stay in the remote store.
#[derive(Debug, Clone, Error)]
#[error(
    "{op} batch failed at '{path}': {source} ({unresolved_at_failure} of {total} operations unresolved at failure, partial remote changes may exist)"
)]
pub struct BatchError {
    pub op: &'static str,
    pub path: String,
    pub source: StoreError,
    pub unresolved_at_failure: usize,
    pub total: usize,
    pub progress: BatchProgress,
}

impl BatchError {
    /// Whether the first failure was a cancellation rather than a store error.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.source, StoreError::Cancelled)
    }
}
