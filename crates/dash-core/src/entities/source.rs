use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::image::StudyImage;
use super::settings::TruncatedNormal;

/// An account that posts appear to come from.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[schemars(length(min = 1))]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<StudyImage>,
    /// Maximum number of posts shown from this source; negative means unlimited.
    pub max_posts: i32,
    pub followers: TruncatedNormal,
    pub credibility: TruncatedNormal,
    /// Share of this source's posts that are true, used by the `source-ratios` method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_post_percentage: Option<f64>,
}

impl Source {
    /// Remaining post capacity, or `None` when unlimited.
    #[must_use]
    pub fn post_capacity(&self) -> Option<u32> {
        u32::try_from(self.max_posts).ok()
    }
}
