//! Fault-injecting store wrapper.
//!
//! Wraps another [`RemoteStore`] and fails chosen calls deterministically:
//! by asset path, or on the n-th call of an operation. Per-path delays let
//! tests control the order in which concurrent calls complete. Every call is
//! counted, including those that fail.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use dash_core::Asset;

use crate::adapter::{RemoteStore, StoreCall, document_id};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Rules {
    by_key: HashMap<String, StoreError>,
    by_ordinal: HashMap<(StoreCall, usize), StoreError>,
    delays: HashMap<String, Duration>,
}

#[derive(Debug, Default)]
struct Ledger {
    counts: HashMap<StoreCall, usize>,
    log: Vec<(StoreCall, String)>,
}

/// A [`RemoteStore`] that fails on command.
///
/// Cloning shares the rules and the call ledger.
#[derive(Debug)]
pub struct FaultyStore<S> {
    inner: Arc<S>,
    rules: Arc<Mutex<Rules>>,
    ledger: Arc<Mutex<Ledger>>,
}

impl<S> Clone for FaultyStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            rules: Arc::clone(&self.rules),
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<S: RemoteStore> FaultyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner: Arc::new(inner),
            rules: Arc::default(),
            ledger: Arc::default(),
        }
    }

    /// Fail every call whose key (asset path or study id) equals `key`.
    #[must_use]
    pub fn fail_key(self, key: impl Into<String>, error: StoreError) -> Self {
        lock(&self.rules).by_key.insert(key.into(), error);
        self
    }

    /// Fail the `n`-th call (1-based) of `call`.
    #[must_use]
    pub fn fail_nth(self, call: StoreCall, n: usize, error: StoreError) -> Self {
        lock(&self.rules).by_ordinal.insert((call, n), error);
        self
    }

    /// Delay every call whose key equals `key` before it reaches the inner store.
    #[must_use]
    pub fn delay_key(self, key: impl Into<String>, delay: Duration) -> Self {
        lock(&self.rules).delays.insert(key.into(), delay);
        self
    }

    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of calls of `call` made so far.
    #[must_use]
    pub fn calls(&self, call: StoreCall) -> usize {
        lock(&self.ledger).counts.get(&call).copied().unwrap_or(0)
    }

    /// Number of calls of any operation made so far.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        lock(&self.ledger).counts.values().sum()
    }

    /// Every call in the order it was made, with its key.
    #[must_use]
    pub fn call_log(&self) -> Vec<(StoreCall, String)> {
        lock(&self.ledger).log.clone()
    }

    /// Record the call and decide whether it fails.
    async fn enter(&self, call: StoreCall, key: &str) -> Result<(), StoreError> {
        let ordinal = {
            let mut ledger = lock(&self.ledger);
            ledger.log.push((call, key.to_string()));
            let count = ledger.counts.entry(call).or_insert(0);
            *count += 1;
            *count
        };
        let (delay, failure) = {
            let rules = lock(&self.rules);
            let failure = rules
                .by_ordinal
                .get(&(call, ordinal))
                .or_else(|| rules.by_key.get(key))
                .cloned();
            (rules.delays.get(key).copied(), failure)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        failure.map_or(Ok(()), Err)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: RemoteStore> RemoteStore for FaultyStore<S> {
    async fn upload_asset(&self, asset: &Asset) -> Result<(), StoreError> {
        self.enter(StoreCall::UploadAsset, &asset.path).await?;
        self.inner.upload_asset(asset).await
    }

    async fn delete_asset(&self, path: &str) -> Result<(), StoreError> {
        self.enter(StoreCall::DeleteAsset, path).await?;
        self.inner.delete_asset(path).await
    }

    async fn fetch_study(&self, id: &str) -> Result<serde_json::Value, StoreError> {
        self.enter(StoreCall::FetchStudy, id).await?;
        self.inner.fetch_study(id).await
    }

    async fn fetch_all_studies(&self) -> Result<Vec<serde_json::Value>, StoreError> {
        self.enter(StoreCall::FetchAllStudies, "").await?;
        self.inner.fetch_all_studies().await
    }

    async fn write_study_metadata(&self, document: &serde_json::Value) -> Result<(), StoreError> {
        let id = document_id(document).unwrap_or_default();
        self.enter(StoreCall::WriteStudyMetadata, id).await?;
        self.inner.write_study_metadata(document).await
    }

    async fn delete_study_metadata(&self, id: &str) -> Result<(), StoreError> {
        self.enter(StoreCall::DeleteStudyMetadata, id).await?;
        self.inner.delete_study_metadata(id).await
    }

    async fn update_study_enabled(
        &self,
        id: &str,
        enabled: bool,
        last_modified_time: i64,
    ) -> Result<(), StoreError> {
        self.enter(StoreCall::UpdateStudyEnabled, id).await?;
        self.inner
            .update_study_enabled(id, enabled, last_modified_time)
            .await
    }

    async fn fetch_results(&self, study_id: &str) -> Result<Vec<serde_json::Value>, StoreError> {
        self.enter(StoreCall::FetchResults, study_id).await?;
        self.inner.fetch_results(study_id).await
    }
}
