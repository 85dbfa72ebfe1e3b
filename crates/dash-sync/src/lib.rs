//! # dash-sync
//!
//! Drives every asset of an [`AssetBatch`](dash_core::AssetBatch) against a
//! [`RemoteStore`](dash_store::RemoteStore) concurrently.
//!
//! All operations are dispatched in one wave with no throttling. The batch
//! settles exactly once: successfully when every operation succeeded, or with
//! the first failure observed. Later outcomes are still recorded in the
//! [`BatchProgress`] carried by the error.

pub mod error;
pub mod progress;
pub mod state;
pub mod synchronizer;

pub use error::BatchError;
pub use progress::BatchProgress;
pub use synchronizer::{BatchOp, Synchronizer};
pub use tokio_util::sync::CancellationToken;
