//! Object-store bucket backend.
//!
//! Layout under the configured prefix:
//!
//! - `{prefix}/assets/{asset path}`: raw asset bytes
//! - `{prefix}/meta/{study id}.json`: study documents
//! - `{prefix}/results/{study id}/{session id}.json`: result documents
//!
//! Deletes are idempotent: removing a missing object succeeds. Toggling the
//! enabled flag rewrites the stored document with only `enabled` and
//! `lastModifiedTime` changed.

use std::sync::Arc;

use dash_config::{BucketConfig, BucketKind};
use dash_core::Asset;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use tracing::debug;

use crate::adapter::{RemoteStore, document_id};
use crate::error::StoreError;

const ASSETS_DIR: &str = "assets";
const META_DIR: &str = "meta";
const RESULTS_DIR: &str = "results";
const META_SUFFIX: &str = ".json";

/// Remote store backed by any `object_store` implementation.
#[derive(Clone)]
pub struct BucketStore {
    store: Arc<dyn ObjectStore>,
    prefix: String,
}

impl std::fmt::Debug for BucketStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketStore")
            .field("store", &self.store.to_string())
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl BucketStore {
    /// Wrap an existing object store.
    pub fn new(store: Arc<dyn ObjectStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into().trim_matches('/').to_string(),
        }
    }

    /// A process-local bucket that lives as long as the value.
    pub fn in_memory(prefix: impl Into<String>) -> Self {
        Self::new(Arc::new(InMemory::new()), prefix)
    }

    /// A bucket rooted at a local directory, created if missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the directory cannot be created or opened.
    pub fn local(
        root: impl AsRef<std::path::Path>,
        prefix: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)
            .map_err(|e| StoreError::Config(format!("cannot create {}: {e}", root.display())))?;
        let store = LocalFileSystem::new_with_prefix(root)
            .map_err(|e| StoreError::Config(e.to_string()))?;
        Ok(Self::new(Arc::new(store), prefix))
    }

    /// Build the bucket described by the `bucket` config section.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the section is incomplete or the
    /// object store cannot be built.
    pub fn from_config(config: &BucketConfig) -> Result<Self, StoreError> {
        if !config.is_configured() {
            return Err(StoreError::Config(
                "bucket section is not configured".to_string(),
            ));
        }
        match config.kind {
            BucketKind::Local => Self::local(&config.root, config.trimmed_prefix()),
            BucketKind::S3 => {
                let mut builder = AmazonS3Builder::new()
                    .with_bucket_name(&config.bucket_name)
                    .with_access_key_id(&config.access_key_id)
                    .with_secret_access_key(&config.secret_access_key);
                if !config.region.is_empty() {
                    builder = builder.with_region(&config.region);
                }
                if !config.endpoint.is_empty() {
                    builder = builder
                        .with_endpoint(&config.endpoint)
                        .with_allow_http(config.endpoint.starts_with("http://"));
                }
                let store = builder
                    .build()
                    .map_err(|e| StoreError::Config(format!("failed to create S3 store: {e}")))?;
                Ok(Self::new(Arc::new(store), config.trimmed_prefix()))
            }
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn location(&self, dir: &str, rest: &str) -> ObjectPath {
        self.prefix
            .split('/')
            .chain(std::iter::once(dir))
            .chain(rest.split('/'))
            .filter(|part| !part.is_empty())
            .collect()
    }

    fn asset_location(&self, path: &str) -> ObjectPath {
        self.location(ASSETS_DIR, path)
    }

    fn meta_location(&self, id: &str) -> ObjectPath {
        let file = format!("{id}{META_SUFFIX}");
        self.prefix
            .split('/')
            .filter(|part| !part.is_empty())
            .chain([META_DIR, file.as_str()])
            .collect()
    }

    fn meta_dir(&self) -> ObjectPath {
        self.location(META_DIR, "")
    }

    fn results_dir(&self, study_id: &str) -> ObjectPath {
        self.prefix
            .split('/')
            .filter(|part| !part.is_empty())
            .chain([RESULTS_DIR, study_id])
            .collect()
    }

    /// Every `.json` object under `dir`, ordered by location.
    async fn read_json_dir(&self, dir: &ObjectPath) -> Result<Vec<serde_json::Value>, StoreError> {
        let mut metas: Vec<_> = self.store.list(Some(dir)).try_collect().await?;
        metas.sort_by(|a, b| a.location.cmp(&b.location));

        let mut documents = Vec::with_capacity(metas.len());
        for meta in metas {
            if !meta.location.as_ref().ends_with(META_SUFFIX) {
                continue;
            }
            let bytes = self.store.get(&meta.location).await?.bytes().await?;
            documents.push(serde_json::from_slice(&bytes)?);
        }
        Ok(documents)
    }

    /// Record a completed session for `study_id`, keyed by its `sessionId`
    /// (or `id`). Participant clients write results; the dashboard only
    /// reads them.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Parse`] if the document has neither key.
    pub async fn write_result(
        &self,
        study_id: &str,
        document: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let key = ["sessionId", "id"]
            .iter()
            .find_map(|field| document.get(*field).and_then(serde_json::Value::as_str))
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                StoreError::Parse("result document has no 'sessionId' or 'id'".to_string())
            })?;
        let file = format!("{key}{META_SUFFIX}");
        let location: ObjectPath = self
            .prefix
            .split('/')
            .filter(|part| !part.is_empty())
            .chain([RESULTS_DIR, study_id, file.as_str()])
            .collect();
        debug!(%location, "bucket: write result");
        let body = serde_json::to_vec(document)?;
        self.store.put(&location, PutPayload::from(body)).await?;
        Ok(())
    }

    /// Raw bytes of a stored asset, for inspection and tests.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no asset is stored at `path`.
    pub async fn asset_bytes(&self, path: &str) -> Result<bytes::Bytes, StoreError> {
        let result = self.store.get(&self.asset_location(path)).await?;
        Ok(result.bytes().await?)
    }

    fn ignore_missing(result: object_store::Result<()>) -> Result<(), StoreError> {
        match result {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl RemoteStore for BucketStore {
    async fn upload_asset(&self, asset: &Asset) -> Result<(), StoreError> {
        let location = self.asset_location(&asset.path);
        debug!(%location, bytes = asset.payload.len(), "bucket: upload asset");
        self.store
            .put(&location, PutPayload::from(asset.payload.clone()))
            .await?;
        Ok(())
    }

    async fn delete_asset(&self, path: &str) -> Result<(), StoreError> {
        let location = self.asset_location(path);
        debug!(%location, "bucket: delete asset");
        Self::ignore_missing(self.store.delete(&location).await)
    }

    async fn fetch_study(&self, id: &str) -> Result<serde_json::Value, StoreError> {
        let location = self.meta_location(id);
        debug!(%location, "bucket: fetch study");
        let result = match self.store.get(&location).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let bytes = result.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn fetch_all_studies(&self) -> Result<Vec<serde_json::Value>, StoreError> {
        let dir = self.meta_dir();
        debug!(%dir, "bucket: fetch all studies");
        self.read_json_dir(&dir).await
    }

    async fn write_study_metadata(&self, document: &serde_json::Value) -> Result<(), StoreError> {
        let location = self.meta_location(document_id(document)?);
        debug!(%location, "bucket: write study metadata");
        let body = serde_json::to_vec(document)?;
        self.store.put(&location, PutPayload::from(body)).await?;
        Ok(())
    }

    async fn delete_study_metadata(&self, id: &str) -> Result<(), StoreError> {
        let location = self.meta_location(id);
        debug!(%location, "bucket: delete study metadata");
        Self::ignore_missing(self.store.delete(&location).await)
    }

    async fn update_study_enabled(
        &self,
        id: &str,
        enabled: bool,
        last_modified_time: i64,
    ) -> Result<(), StoreError> {
        let mut document = self.fetch_study(id).await?;
        let fields = document.as_object_mut().ok_or_else(|| {
            StoreError::Parse(format!("stored study '{id}' is not a JSON object"))
        })?;
        fields.insert("enabled".to_string(), enabled.into());
        fields.insert("lastModifiedTime".to_string(), last_modified_time.into());

        let location = self.meta_location(id);
        debug!(%location, enabled, "bucket: update study enabled");
        let body = serde_json::to_vec(&document)?;
        self.store.put(&location, PutPayload::from(body)).await?;
        Ok(())
    }

    async fn fetch_results(&self, study_id: &str) -> Result<Vec<serde_json::Value>, StoreError> {
        let dir = self.results_dir(study_id);
        debug!(%dir, "bucket: fetch results");
        self.read_json_dir(&dir).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;

    fn asset(path: &str, body: &'static [u8]) -> Asset {
        Asset::new(path, Bytes::from_static(body), "image/png")
    }

    #[test]
    fn layout_follows_prefix() {
        let store = BucketStore::in_memory("/prod/studies/");
        assert_eq!(store.prefix(), "prod/studies");
        assert_eq!(
            store.asset_location("s1/p1-abc.png").as_ref(),
            "prod/studies/assets/s1/p1-abc.png"
        );
        assert_eq!(
            store.meta_location("s1").as_ref(),
            "prod/studies/meta/s1.json"
        );
    }

    #[tokio::test]
    async fn upload_overwrites_by_path() {
        let store = BucketStore::in_memory("studies");
        store.upload_asset(&asset("s/a.png", b"one")).await.unwrap();
        store.upload_asset(&asset("s/a.png", b"two")).await.unwrap();
        assert_eq!(store.asset_bytes("s/a.png").await.unwrap(), Bytes::from_static(b"two"));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = BucketStore::in_memory("studies");
        store.upload_asset(&asset("s/a.png", b"x")).await.unwrap();
        store.delete_asset("s/a.png").await.unwrap();
        store.delete_asset("s/a.png").await.unwrap();
        assert!(matches!(
            store.asset_bytes("s/a.png").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn metadata_is_insert_or_update() {
        let store = BucketStore::in_memory("studies");
        store
            .write_study_metadata(&serde_json::json!({"id": "s1", "version": 1}))
            .await
            .unwrap();
        store
            .write_study_metadata(&serde_json::json!({"id": "s1", "version": 2}))
            .await
            .unwrap();
        let doc = store.fetch_study("s1").await.unwrap();
        assert_eq!(doc["version"], serde_json::json!(2));
        assert_eq!(store.fetch_all_studies().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_study_is_not_found() {
        let store = BucketStore::in_memory("studies");
        let err = store.fetch_study("ghost").await.unwrap_err();
        assert_eq!(err, StoreError::NotFound("ghost".into()));
    }

    #[tokio::test]
    async fn fetch_all_ignores_assets() {
        let store = BucketStore::in_memory("studies");
        store.upload_asset(&asset("s1/x.png", b"x")).await.unwrap();
        for id in ["b", "a"] {
            store
                .write_study_metadata(&serde_json::json!({ "id": id }))
                .await
                .unwrap();
        }
        let ids: Vec<_> = store
            .fetch_all_studies()
            .await
            .unwrap()
            .into_iter()
            .map(|doc| doc["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn enabled_update_keeps_the_rest_of_the_document() {
        let store = BucketStore::in_memory("studies");
        store
            .write_study_metadata(&serde_json::json!({
                "id": "s1",
                "enabled": false,
                "lastModifiedTime": 10,
                "posts": "not decoded here"
            }))
            .await
            .unwrap();
        store.update_study_enabled("s1", true, 11).await.unwrap();

        let doc = store.fetch_study("s1").await.unwrap();
        assert_eq!(
            doc,
            serde_json::json!({
                "id": "s1",
                "enabled": true,
                "lastModifiedTime": 11,
                "posts": "not decoded here"
            })
        );
    }

    #[tokio::test]
    async fn enabled_update_of_missing_study_is_not_found() {
        let store = BucketStore::in_memory("studies");
        let err = store.update_study_enabled("ghost", true, 1).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound("ghost".into()));
    }

    #[tokio::test]
    async fn results_are_listed_per_study() {
        let store = BucketStore::in_memory("studies");
        for (study, session) in [("s1", "b"), ("s1", "a"), ("s2", "c")] {
            store
                .write_result(study, &serde_json::json!({ "sessionId": session }))
                .await
                .unwrap();
        }
        let sessions: Vec<_> = store
            .fetch_results("s1")
            .await
            .unwrap()
            .into_iter()
            .map(|doc| doc["sessionId"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(sessions, vec!["a".to_string(), "b".to_string()]);
        assert!(store.fetch_results("empty").await.unwrap().is_empty());
        assert!(store.fetch_all_studies().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn result_without_key_is_rejected() {
        let store = BucketStore::in_memory("studies");
        let err = store
            .write_result("s1", &serde_json::json!({"participant": {}}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
    }

    #[tokio::test]
    async fn write_without_id_is_rejected() {
        let store = BucketStore::in_memory("studies");
        let err = store
            .write_study_metadata(&serde_json::json!({"name": "x"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
    }
}
