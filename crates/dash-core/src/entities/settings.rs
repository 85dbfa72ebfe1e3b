use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Reaction;

/// Settings every study must define.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BasicSettings {
    #[schemars(length(min = 1))]
    pub name: String,
    pub description: String,
    pub prompt: String,
    /// Number of posts a participant is shown.
    #[schemars(range(min = 1))]
    pub length: u32,
    pub require_reactions: bool,
    pub require_comments: bool,
    pub require_identification: bool,
    pub display_followers: bool,
    pub display_credibility: bool,
    pub display_progress: bool,
    pub display_number_of_reactions: bool,
    pub post_enabled_reactions: BTreeSet<Reaction>,
    pub comment_enabled_reactions: BTreeSet<Reaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedSettings {
    pub minimum_comment_length: u32,
    pub prompt_delay_seconds: u32,
    pub react_delay_seconds: u32,
    pub gen_completion_code: bool,
    pub completion_code_digits: u32,
    pub gen_random_default_avatars: bool,
}

/// Text of the pages shown around the feed, each with a minimum display delay.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PagesSettings {
    pub pre_intro: String,
    pub pre_intro_delay_seconds: u32,
    pub rules: String,
    pub rules_delay_seconds: u32,
    pub post_intro: String,
    pub post_intro_delay_seconds: u32,
    pub debrief: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UiSettings {
    pub display_posts_in_feed: bool,
    pub display_followers_in_feed: bool,
    pub display_credibility_in_feed: bool,
    /// Overrides for interface labels, keyed by label id.
    pub labels: BTreeMap<String, String>,
}

/// Parameters of a normal distribution truncated to `[min, max]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TruncatedNormal {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl TruncatedNormal {
    /// A degenerate distribution that always yields `value`.
    #[must_use]
    pub const fn fixed(value: f64) -> Self {
        Self {
            mean: value,
            std_dev: 0.0,
            min: value,
            max: value,
        }
    }

    /// Check that the bounds are ordered and the spread is non-negative.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the parameters are unusable.
    pub fn check(&self) -> Result<(), String> {
        if [self.mean, self.min, self.max].iter().any(|v| !v.is_finite()) {
            return Err("mean, min and max must be finite".to_string());
        }
        let ordered = matches!(
            self.min.partial_cmp(&self.max),
            Some(Ordering::Less | Ordering::Equal)
        );
        if !ordered {
            return Err(format!("min {} is greater than max {}", self.min, self.max));
        }
        if self.std_dev.is_nan() || self.std_dev < 0.0 {
            return Err(format!("stdDev {} is negative", self.std_dev));
        }
        Ok(())
    }

    /// The value the simulated participant observes: the mean, clamped to the bounds.
    #[must_use]
    pub fn expected(&self) -> f64 {
        if self.min <= self.max {
            self.mean.clamp(self.min, self.max)
        } else {
            self.mean
        }
    }
}

/// How sources and posts are paired when building a participant's feed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SourcePostSelectionMethod {
    /// A fixed share of all shown posts is true.
    OverallRatio {
        #[serde(rename = "truePostPercentage")]
        true_post_percentage: f64,
    },
    /// Each source carries its own true-post percentage.
    SourceRatios,
    /// True-post percentage grows linearly with the source's credibility.
    Credibility { slope: f64, intercept: f64 },
}

impl SourcePostSelectionMethod {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OverallRatio { .. } => "overall-ratio",
            Self::SourceRatios => "source-ratios",
            Self::Credibility { .. } => "credibility",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn selection_method_is_internally_tagged() {
        let method = SourcePostSelectionMethod::OverallRatio {
            true_post_percentage: 50.0,
        };
        let json = serde_json::to_value(method).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "overall-ratio", "truePostPercentage": 50.0})
        );
        let back: SourcePostSelectionMethod =
            serde_json::from_value(serde_json::json!({"type": "source-ratios"})).unwrap();
        assert_eq!(back, SourcePostSelectionMethod::SourceRatios);
    }

    #[test]
    fn expected_value_is_clamped() {
        let dist = TruncatedNormal {
            mean: 120.0,
            std_dev: 5.0,
            min: 0.0,
            max: 100.0,
        };
        assert!((dist.expected() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn inverted_bounds_fail_check_without_panicking() {
        let dist = TruncatedNormal {
            mean: 1.0,
            std_dev: 1.0,
            min: 5.0,
            max: 0.0,
        };
        assert!(dist.check().is_err());
        assert!((dist.expected() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn fixed_distribution_is_valid() {
        let dist = TruncatedNormal::fixed(3.0);
        assert!(dist.check().is_ok());
        assert!((dist.expected() - 3.0).abs() < f64::EPSILON);
    }
}
