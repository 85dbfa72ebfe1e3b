use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::image::StudyImage;
use super::post::{Post, PostContent};
use super::settings::{
    AdvancedSettings, BasicSettings, PagesSettings, SourcePostSelectionMethod, UiSettings,
};
use super::source::Source;
use crate::asset::AssetBatch;
use crate::errors::ModelError;

/// The modification time that follows `previous`: `now_ms`, or one past
/// `previous` if the clock has not moved forward.
#[must_use]
pub const fn next_modified_time(previous: i64, now_ms: i64) -> i64 {
    let bumped = previous.saturating_add(1);
    if now_ms > bumped { now_ms } else { bumped }
}

/// [`next_modified_time`] against the wall clock.
#[must_use]
pub fn next_modified_time_now(previous: i64) -> i64 {
    next_modified_time(previous, Utc::now().timestamp_millis())
}

/// A complete study configuration, the unit that is verified and published.
///
/// `id` and `version` have no serde default: a document without them does
/// not decode.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Study {
    #[schemars(length(min = 1))]
    pub id: String,
    pub version: u32,
    #[serde(rename = "authorID")]
    pub author_id: String,
    pub author_name: String,
    /// Milliseconds since the Unix epoch; strictly increases on every save.
    pub last_modified_time: i64,
    pub enabled: bool,
    pub basic_settings: BasicSettings,
    pub advanced_settings: AdvancedSettings,
    pub pages_settings: PagesSettings,
    pub ui_settings: UiSettings,
    pub source_post_selection_method: SourcePostSelectionMethod,
    pub sources: Vec<Source>,
    pub posts: Vec<Post>,
}

impl Study {
    /// Bump `last_modified_time` to `now_ms`, or one past its previous value
    /// if the clock has not moved forward.
    pub fn touch(&mut self, now_ms: i64) {
        self.last_modified_time = next_modified_time(self.last_modified_time, now_ms);
    }

    pub fn touch_now(&mut self) {
        self.touch(Utc::now().timestamp_millis());
    }

    #[must_use]
    pub fn source(&self, id: &str) -> Option<&Source> {
        self.sources.iter().find(|source| source.id == id)
    }

    /// Every image referenced by the study: source avatars first, then post images.
    pub fn images(&self) -> impl Iterator<Item = &StudyImage> {
        self.sources
            .iter()
            .filter_map(|source| source.avatar.as_ref())
            .chain(self.posts.iter().filter_map(Post::image))
    }

    /// Storage paths of every referenced image, deduplicated, in reference order.
    #[must_use]
    pub fn image_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = Vec::new();
        for image in self.images() {
            if !paths.iter().any(|p| p == image.path()) {
                paths.push(image.path().to_string());
            }
        }
        paths
    }

    /// Collect the images that still carry bytes into one upload batch.
    ///
    /// Images that are only path references are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateAsset`] if two images share a path but
    /// not their content.
    pub fn pending_assets(&self) -> Result<AssetBatch, ModelError> {
        let mut batch = AssetBatch::new();
        for asset in self.images().filter_map(StudyImage::to_asset) {
            batch.insert(asset)?;
        }
        Ok(batch)
    }

    /// Drop in-memory image bytes once the batch carrying them has succeeded.
    pub fn mark_assets_stored(&mut self) {
        for source in &mut self.sources {
            if let Some(avatar) = source.avatar.take() {
                source.avatar = Some(avatar.into_stored());
            }
        }
        for post in &mut self.posts {
            if let PostContent::Image(image) = &mut post.content {
                *image = image.clone().into_stored();
            }
        }
    }
}
