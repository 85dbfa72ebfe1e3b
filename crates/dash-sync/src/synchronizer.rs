//! The batch synchronizer.

use std::fmt;

use dash_core::{Asset, AssetBatch};
use dash_store::{RemoteStore, StoreError};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::BatchError;
use crate::progress::BatchProgress;
use crate::state::{BatchState, Phase};

/// What the batch does with each asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOp {
    Upload,
    Delete,
}

impl BatchOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for BatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type ProgressFn<'a> = Box<dyn FnMut(usize, usize) + Send + 'a>;

/// Runs asset batches against one store.
///
/// ```ignore
/// let report = Synchronizer::new(&store)
///     .on_progress(|done, total| println!("{done}/{total}"))
///     .run(batch, BatchOp::Upload)
///     .await?;
/// ```
pub struct Synchronizer<'a, S> {
    store: &'a S,
    cancel: CancellationToken,
    on_progress: Option<ProgressFn<'a>>,
}

impl<'a, S: RemoteStore> Synchronizer<'a, S> {
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            cancel: CancellationToken::new(),
            on_progress: None,
        }
    }

    /// Share a cancellation signal with the caller.
    ///
    /// Operations that have not started when the token fires record
    /// [`StoreError::Cancelled`] without calling the store. Operations already
    /// in flight run to completion.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Called with `(completed, total)` after each successful operation, in
    /// completion order.
    #[must_use]
    pub fn on_progress(mut self, callback: impl FnMut(usize, usize) + Send + 'a) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Run every operation of `batch` and settle once.
    ///
    /// Every operation is awaited even after a failure, so the returned
    /// progress is complete either way.
    ///
    /// # Errors
    ///
    /// Returns a [`BatchError`] naming the first operation that failed.
    pub async fn run(mut self, batch: AssetBatch, op: BatchOp) -> Result<BatchProgress, BatchError> {
        let total = batch.len();
        let mut state = BatchState::new();
        let mut in_flight = FuturesUnordered::new();

        for asset in batch {
            in_flight.push(Self::dispatch(self.store, self.cancel.clone(), asset, op));
            state.record_started();
        }
        state.finish_dispatch();
        debug!(%op, total, "batch dispatched");

        while let Some((path, result)) = in_flight.next().await {
            if let Err(err) = &result {
                warn!(%op, %path, error = %err, "batch operation failed");
            }
            if state.record(path, result) {
                if let Some(callback) = self.on_progress.as_mut() {
                    callback(state.progress().completed, total);
                }
            }
        }

        let (phase, progress) = state.into_parts();
        match phase {
            Phase::Failed(first) => {
                warn!(
                    %op,
                    path = %first.path,
                    failed = progress.errors.len(),
                    completed = progress.completed,
                    "batch failed"
                );
                Err(BatchError {
                    op: op.as_str(),
                    path: first.path,
                    source: first.error,
                    unresolved_at_failure: first.unresolved,
                    total,
                    progress,
                })
            }
            Phase::Succeeded | Phase::Running => {
                info!(%op, completed = progress.completed, "batch settled");
                Ok(progress)
            }
        }
    }

    fn dispatch(
        store: &'a S,
        cancel: CancellationToken,
        asset: Asset,
        op: BatchOp,
    ) -> impl Future<Output = (String, Result<(), StoreError>)> + Send + 'a {
        async move {
            if cancel.is_cancelled() {
                debug!(%op, path = %asset.path, "skipped, batch cancelled");
                return (asset.path, Err(StoreError::Cancelled));
            }
            debug!(%op, path = %asset.path, "batch operation started");
            let result = match op {
                BatchOp::Upload => store.upload_asset(&asset).await,
                BatchOp::Delete => store.delete_asset(&asset.path).await,
            };
            (asset.path, result)
        }
    }
}
