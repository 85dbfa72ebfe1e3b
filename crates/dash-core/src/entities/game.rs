use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::study::Study;
use crate::enums::Reaction;
use crate::errors::ModelError;

/// One play-through of a study.
///
/// A Game is derived from a Study. The verification pipeline builds one by
/// simulation to prove the study is playable; participant clients record
/// real ones as results, which the dashboard reads back and checks against
/// the study with [`Game::check_against`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    #[schemars(length(min = 1))]
    pub session_id: String,
    pub study_id: String,
    /// `lastModifiedTime` of the study the session was built from.
    pub study_modified_time: i64,
    pub started_at: i64,
    pub finished_at: i64,
    pub participant: Participant,
    /// One state per post shown, in display order.
    pub states: Vec<GameState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_code: Option<String>,
    pub dismissed_prompt: bool,
}

impl Game {
    /// Check that every post and source this session refers to exists in
    /// `study`, and that the session was recorded for it.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ForeignSession`] naming the first offending field.
    pub fn check_against(&self, study: &Study) -> Result<(), ModelError> {
        let foreign = |field: String, reason: String| ModelError::ForeignSession {
            study_id: study.id.clone(),
            field,
            reason,
        };
        if self.study_id != study.id {
            return Err(foreign(
                "studyId".to_string(),
                format!("is '{}'", self.study_id),
            ));
        }

        let has_post = |id: &str| study.posts.iter().any(|post| post.id == id);
        let has_source = |id: &str| study.source(id).is_some();
        let references = self
            .states
            .iter()
            .enumerate()
            .flat_map(|(i, state)| {
                [
                    (format!("states[{i}].post.postId"), &state.post.post_id, true),
                    (format!("states[{i}].source.sourceId"), &state.source.source_id, false),
                ]
            })
            .chain(
                self.participant
                    .interactions
                    .iter()
                    .enumerate()
                    .flat_map(|(i, interaction)| {
                        [
                            (
                                format!("participant.interactions[{i}].postId"),
                                &interaction.post_id,
                                true,
                            ),
                            (
                                format!("participant.interactions[{i}].sourceId"),
                                &interaction.source_id,
                                false,
                            ),
                        ]
                    }),
            );

        for (field, id, is_post) in references {
            let known = if is_post {
                has_post(id.as_str())
            } else {
                has_source(id.as_str())
            };
            if !known {
                let kind = if is_post { "post" } else { "source" };
                return Err(foreign(field, format!("names unknown {kind} '{id}'")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<String>,
    pub followers: f64,
    pub credibility: f64,
    pub interactions: Vec<Interaction>,
}

/// What the participant did with one post.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub post_id: String,
    pub source_id: String,
    pub reactions: BTreeSet<Reaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub react_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub index: u32,
    pub source: GameSource,
    pub post: GamePost,
    /// Participant followers after reacting to this post.
    pub participant_followers: f64,
    /// Participant credibility after reacting to this post.
    pub participant_credibility: f64,
}

/// A source as it appeared when its post was shown.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameSource {
    pub source_id: String,
    pub followers: f64,
    pub credibility: f64,
    /// Posts the source may still show after this one; absent when unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_posts: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GamePost {
    pub post_id: String,
    pub is_true: bool,
}
