use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::image::StudyImage;
use super::settings::TruncatedNormal;
use crate::enums::Reaction;

/// Body of a post: either plain text or a single image.
///
/// Serialized as `{"text": "..."}` or `{"image": "<path>"}`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PostContent {
    Text(String),
    Image(StudyImage),
}

/// A pre-written comment displayed under a post.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PostComment {
    pub source_name: String,
    pub message: String,
    #[serde(default)]
    pub number_of_reactions: BTreeMap<Reaction, u32>,
}

/// A post shown in the participant's feed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[schemars(length(min = 1))]
    pub id: String,
    pub headline: String,
    pub content: PostContent,
    pub is_true: bool,
    /// Change applied to the participant's followers, per reaction.
    #[serde(default)]
    pub changes_to_followers: BTreeMap<Reaction, TruncatedNormal>,
    /// Change applied to the participant's credibility, per reaction.
    #[serde(default)]
    pub changes_to_credibility: BTreeMap<Reaction, TruncatedNormal>,
    #[serde(default)]
    pub comments: Vec<PostComment>,
}

impl Post {
    #[must_use]
    pub const fn image(&self) -> Option<&StudyImage> {
        match &self.content {
            PostContent::Image(image) => Some(image),
            PostContent::Text(_) => None,
        }
    }
}
