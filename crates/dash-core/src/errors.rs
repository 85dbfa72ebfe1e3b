//! Cross-cutting error types for the studydash object model.
//!
//! Schema, store, and pipeline errors live in their own crates. The errors
//! here are raised while building or simulating the object graph itself.

use thiserror::Error;

/// Errors raised while constructing model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// An image path cannot be mapped back to an image.
    #[error("invalid image path '{path}': {reason}")]
    InvalidImagePath { path: String, reason: String },

    /// Two different payloads were submitted under the same asset path.
    #[error("duplicate asset path '{path}' with differing content")]
    DuplicateAsset { path: String },

    /// A recorded session refers to something its study does not define.
    #[error("session does not belong to study '{study_id}': {field} {reason}")]
    ForeignSession {
        study_id: String,
        field: String,
        reason: String,
    },
}

/// A Study cannot produce a valid simulated session.
///
/// Every variant names the entity or field that broke the simulation so the
/// message can be surfaced without further context.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("study has no sources")]
    NoSources,

    #[error("study has no posts")]
    NoPosts,

    #[error("duplicate source id '{0}'")]
    DuplicateSourceId(String),

    #[error("duplicate post id '{0}'")]
    DuplicatePostId(String),

    /// `basicSettings.length` asks for more posts than the study defines.
    #[error("basicSettings.length is {required} but the study only has {available} posts")]
    NotEnoughPosts { required: u32, available: usize },

    /// The `source-ratios` selection method needs a percentage on every source.
    #[error(
        "source '{source_id}' has no truePostPercentage, required by the source-ratios selection method"
    )]
    MissingSourceRatio { source_id: String },

    #[error("{field} must be within 0..=100, got {value}")]
    InvalidPercentage { field: String, value: f64 },

    #[error("{field} is not a valid distribution: {reason}")]
    InvalidDistribution { field: String, reason: String },

    #[error("basicSettings.requireReactions is set but postEnabledReactions is empty")]
    NoEnabledReactions,

    #[error("advancedSettings.completionCodeDigits must be within 1..=32, got {0}")]
    InvalidCompletionCodeDigits(u32),

    /// The simulated session could not pick a source or post at some step.
    #[error("simulation exhausted at step {step}: {reason}")]
    Exhausted { step: u32, reason: String },
}
