//! Publish orchestrator and study lifecycle operations.

use dash_core::AssetBatch;
use dash_core::entities::{Study, next_modified_time_now};
use dash_schema::{ConfigCodec, JsonCodec};
use dash_store::RemoteStore;
use dash_sync::{BatchOp, CancellationToken, Synchronizer};
use dash_verify::Pipeline;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::entry::{ResultEntry, StudyEntry};
use crate::error::PublishError;

/// Outcome of a successful publish.
#[derive(Debug, Clone)]
pub struct Published {
    /// The study as stored: modification time bumped, image bytes dropped.
    pub study: Study,
    /// The document written as study metadata.
    pub document: Value,
    pub assets_uploaded: usize,
}

/// A study's enabled flag after [`Publisher::set_enabled`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnabledState {
    pub id: String,
    pub enabled: bool,
    pub last_modified_time: i64,
}

/// Publishes and manages studies in one remote store.
pub struct Publisher<S, C = JsonCodec> {
    store: S,
    pipeline: Pipeline<C>,
    cancel: CancellationToken,
}

impl<S: RemoteStore> Publisher<S, JsonCodec> {
    pub fn new(store: S) -> Self {
        Self::with_pipeline(store, Pipeline::default())
    }
}

impl<S: RemoteStore, C: ConfigCodec> Publisher<S, C> {
    pub fn with_pipeline(store: S, pipeline: Pipeline<C>) -> Self {
        Self {
            store,
            pipeline,
            cancel: CancellationToken::new(),
        }
    }

    /// Share a cancellation signal with every asset batch this publisher runs.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn pipeline(&self) -> &Pipeline<C> {
        &self.pipeline
    }

    /// Verify, upload pending assets, then write the study metadata.
    ///
    /// # Errors
    ///
    /// See [`Self::publish_with_progress`].
    pub async fn publish(&self, study: &Study) -> Result<Published, PublishError> {
        self.publish_with_progress(study, |_, _| {}).await
    }

    /// [`Self::publish`], reporting `(uploaded, total)` after each asset.
    ///
    /// # Errors
    ///
    /// - [`PublishError::Verification`] if any verification stage fails; no
    ///   store call is made.
    /// - [`PublishError::Batch`] if an asset upload fails; assets uploaded
    ///   before it are not removed.
    /// - [`PublishError::Metadata`] if every asset was uploaded but the
    ///   metadata write failed.
    pub async fn publish_with_progress(
        &self,
        study: &Study,
        on_progress: impl FnMut(usize, usize) + Send,
    ) -> Result<Published, PublishError> {
        let mut study = study.clone();
        study.touch_now();

        let verified = self.pipeline.verify(&study)?;
        let assets = study.pending_assets()?;
        let total = assets.len();
        info!(study_id = %study.id, assets = total, "study verified, uploading assets");

        Synchronizer::new(&self.store)
            .with_cancellation(self.cancel.clone())
            .on_progress(on_progress)
            .run(assets, BatchOp::Upload)
            .await?;

        self.store
            .write_study_metadata(&verified.document)
            .await
            .map_err(|source| PublishError::Metadata {
                study_id: study.id.clone(),
                uploaded: total,
                source,
            })?;

        study.mark_assets_stored();
        info!(study_id = %study.id, assets = total, "study published");
        Ok(Published {
            study,
            document: verified.document,
            assets_uploaded: total,
        })
    }

    /// Publish a raw study document.
    ///
    /// The document is type-checked before it is decoded. Images in a decoded
    /// document are path references, so no assets are uploaded.
    ///
    /// # Errors
    ///
    /// Same as [`Self::publish_with_progress`].
    pub async fn publish_document(&self, document: &Value) -> Result<Published, PublishError> {
        let verified = self.pipeline.verify_document(document)?;
        self.publish(&verified.study).await
    }

    /// Fetch and decode one study.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Store`] if the fetch fails (including a missing
    /// study) and [`PublishError::Decode`] if the document is malformed.
    pub async fn fetch_study(&self, id: &str) -> Result<Study, PublishError> {
        let document = self.fetch_document(id).await?;
        self.decode(id, &document)
    }

    /// Fetch and decode every study, keeping undecodable documents as
    /// [`StudyEntry::Broken`].
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Store`] if the listing itself fails.
    pub async fn list_studies(&self) -> Result<Vec<StudyEntry>, PublishError> {
        let documents =
            self.store
                .fetch_all_studies()
                .await
                .map_err(|source| PublishError::Store {
                    op: "list",
                    study_id: "*".to_string(),
                    source,
                })?;

        let entries = documents
            .into_iter()
            .map(|document| {
                let id = document.get("id").and_then(Value::as_str).map(str::to_string);
                match self.pipeline.codec().decode_study(&document) {
                    Ok(study) => StudyEntry::Valid(Box::new(study)),
                    Err(err) => {
                        warn!(id = id.as_deref().unwrap_or("<none>"), error = %err, "broken study");
                        StudyEntry::Broken {
                            id,
                            error: err.to_string(),
                            document,
                        }
                    }
                }
            })
            .collect();
        Ok(entries)
    }

    /// Delete every image a study references, then its metadata.
    ///
    /// Image paths are read from the raw document, so a study that no longer
    /// decodes can still be deleted.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Batch`] if an image delete fails, in which case
    /// the metadata is kept, and [`PublishError::Store`] if the fetch or the
    /// metadata delete fails.
    pub async fn delete_study(&self, id: &str) -> Result<usize, PublishError> {
        let document = self.fetch_document(id).await?;
        let paths = referenced_paths(&document);
        let count = paths.len();

        Synchronizer::new(&self.store)
            .with_cancellation(self.cancel.clone())
            .run(AssetBatch::references(paths), BatchOp::Delete)
            .await?;

        self.store
            .delete_study_metadata(id)
            .await
            .map_err(|source| PublishError::Store {
                op: "delete",
                study_id: id.to_string(),
                source,
            })?;
        info!(study_id = %id, images = count, "study deleted");
        Ok(count)
    }

    /// Enable or disable a stored study and bump its modification time.
    ///
    /// Only `enabled` and `lastModifiedTime` change remotely; the rest of the
    /// stored document is neither decoded nor rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Store`] if the study is missing or the update
    /// fails.
    pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<EnabledState, PublishError> {
        let document = self.fetch_document(id).await?;
        let previous = document
            .get("lastModifiedTime")
            .and_then(Value::as_i64)
            .unwrap_or_default();
        let last_modified_time = next_modified_time_now(previous);

        self.store
            .update_study_enabled(id, enabled, last_modified_time)
            .await
            .map_err(|source| PublishError::Store {
                op: "enable",
                study_id: id.to_string(),
                source,
            })?;
        info!(study_id = %id, enabled, "study enabled state changed");
        Ok(EnabledState {
            id: id.to_string(),
            enabled,
            last_modified_time,
        })
    }

    /// Fetch every recorded session of a study and check each against it.
    ///
    /// Results that fail to decode, or that refer to posts or sources the
    /// study does not define, become [`ResultEntry::Broken`].
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Store`] if the study or its results cannot be
    /// fetched and [`PublishError::Decode`] if the study itself is malformed.
    pub async fn study_results(&self, study_id: &str) -> Result<Vec<ResultEntry>, PublishError> {
        let study = self.fetch_study(study_id).await?;
        let documents =
            self.store
                .fetch_results(study_id)
                .await
                .map_err(|source| PublishError::Store {
                    op: "results",
                    study_id: study_id.to_string(),
                    source,
                })?;

        let entries: Vec<ResultEntry> = documents
            .into_iter()
            .map(|document| self.decode_result(&study, document))
            .collect();
        let broken = entries.iter().filter(|entry| entry.is_broken()).count();
        info!(study_id, results = entries.len(), broken, "study results fetched");
        Ok(entries)
    }

    async fn fetch_document(&self, id: &str) -> Result<Value, PublishError> {
        self.store
            .fetch_study(id)
            .await
            .map_err(|source| PublishError::Store {
                op: "fetch",
                study_id: id.to_string(),
                source,
            })
    }

    fn decode_result(&self, study: &Study, document: Value) -> ResultEntry {
        let decoded = self
            .pipeline
            .codec()
            .decode_game(&document)
            .map_err(|err| err.to_string())
            .and_then(|game| {
                game.check_against(study)
                    .map(|()| game)
                    .map_err(|err| err.to_string())
            });
        match decoded {
            Ok(game) => ResultEntry::Valid(Box::new(game)),
            Err(error) => {
                let id = ["sessionId", "id"]
                    .iter()
                    .find_map(|key| document.get(*key).and_then(Value::as_str))
                    .map(str::to_string);
                let participant_id = document.get("participant").and_then(|participant| {
                    ["participantId", "participantID"]
                        .iter()
                        .find_map(|key| participant.get(*key).and_then(Value::as_str))
                        .map(str::to_string)
                });
                warn!(
                    study_id = %study.id,
                    id = id.as_deref().unwrap_or("<none>"),
                    error = %error,
                    "broken result"
                );
                ResultEntry::Broken {
                    id,
                    participant_id,
                    error,
                    document,
                }
            }
        }
    }

    fn decode(&self, id: &str, document: &Value) -> Result<Study, PublishError> {
        self.pipeline
            .codec()
            .decode_study(document)
            .map_err(|source| PublishError::Decode {
                study_id: id.to_string(),
                source,
            })
    }
}

/// Image paths referenced by a raw study document: source avatars, then
/// post images, without duplicates.
#[must_use]
pub fn referenced_paths(document: &Value) -> Vec<String> {
    let avatars = document
        .get("sources")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|source| source.get("avatar"));
    let images = document
        .get("posts")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|post| post.get("content")?.get("image"));

    let mut paths: Vec<String> = Vec::new();
    for path in avatars.chain(images).filter_map(Value::as_str) {
        if !path.is_empty() && !paths.iter().any(|p| p == path) {
            paths.push(path.to_string());
        }
    }
    paths
}
