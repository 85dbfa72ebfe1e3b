//! Structural equality that reports where two values differ.
//!
//! Every entity implements [`StructuralDiff`] field by field, independent of
//! the wire format. Reported paths use the camelCase wire names joined with
//! `.`, with `[i]` for sequence positions (e.g. `posts[0].headline`).
//!
//! - Sequences are order-sensitive. A sequence whose elements are all present
//!   but reordered is reported once, at the sequence's own path.
//! - Keyed mappings and sets are order-insensitive.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use crate::entities::{
    AdvancedSettings, BasicSettings, Game, GamePost, GameSource, GameState, Interaction,
    PagesSettings, Participant, Post, PostComment, PostContent, Source, SourcePostSelectionMethod,
    Study, StudyImage, TruncatedNormal, UiSettings,
};
use crate::enums::{ImageKind, Reaction};

/// Path reported for a difference at the root of the compared value.
pub const ROOT_PATH: &str = "$";

pub trait StructuralDiff {
    /// Append the path of every differing field below `path` to `out`.
    fn diff_into(&self, other: &Self, path: &str, out: &mut Vec<String>);

    /// Every differing field path, empty when the values are structurally equal.
    fn diff(&self, other: &Self) -> Vec<String> {
        let mut out = Vec::new();
        self.diff_into(other, "", &mut out);
        out
    }

    fn structurally_eq(&self, other: &Self) -> bool {
        self.diff(other).is_empty()
    }
}

fn join(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{path}.{field}")
    }
}

fn label(path: &str) -> String {
    if path.is_empty() {
        ROOT_PATH.to_string()
    } else {
        path.to_string()
    }
}

// ---------------------------------------------------------------------------
// Leaves and collections
// ---------------------------------------------------------------------------

macro_rules! leaf_diff {
    ($($ty:ty),* $(,)?) => {
        $(
            impl StructuralDiff for $ty {
                #[allow(clippy::float_cmp)]
                fn diff_into(&self, other: &Self, path: &str, out: &mut Vec<String>) {
                    if self != other {
                        out.push(label(path));
                    }
                }
            }
        )*
    };
}

leaf_diff!(String, bool, u32, u64, i32, i64, f64, Reaction, ImageKind, StudyImage);

impl<T: StructuralDiff> StructuralDiff for Option<T> {
    fn diff_into(&self, other: &Self, path: &str, out: &mut Vec<String>) {
        match (self, other) {
            (None, None) => {}
            (Some(a), Some(b)) => a.diff_into(b, path, out),
            _ => out.push(label(path)),
        }
    }
}

impl<T: StructuralDiff> StructuralDiff for Vec<T> {
    fn diff_into(&self, other: &Self, path: &str, out: &mut Vec<String>) {
        if self.len() != other.len() {
            out.push(label(path));
            return;
        }
        let mut element_diffs = Vec::new();
        for (i, (a, b)) in self.iter().zip(other).enumerate() {
            a.diff_into(b, &format!("{path}[{i}]"), &mut element_diffs);
        }
        if element_diffs.is_empty() {
            return;
        }
        if is_reordering(self, other) {
            out.push(label(path));
        } else {
            out.extend(element_diffs);
        }
    }
}

/// True when `b` holds exactly the elements of `a`, in some order.
fn is_reordering<T: StructuralDiff>(a: &[T], b: &[T]) -> bool {
    let mut used = vec![false; b.len()];
    a.iter().all(|x| {
        let found = (0..b.len()).find(|&j| !used[j] && x.structurally_eq(&b[j]));
        found.is_some_and(|j| {
            used[j] = true;
            true
        })
    })
}

impl<K, V> StructuralDiff for BTreeMap<K, V>
where
    K: Ord + Display,
    V: StructuralDiff,
{
    fn diff_into(&self, other: &Self, path: &str, out: &mut Vec<String>) {
        let keys: BTreeSet<&K> = self.keys().chain(other.keys()).collect();
        for key in keys {
            let key_path = join(path, &key.to_string());
            match (self.get(key), other.get(key)) {
                (Some(a), Some(b)) => a.diff_into(b, &key_path, out),
                _ => out.push(key_path),
            }
        }
    }
}

impl<T: Ord> StructuralDiff for BTreeSet<T> {
    fn diff_into(&self, other: &Self, path: &str, out: &mut Vec<String>) {
        if self != other {
            out.push(label(path));
        }
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// Implement [`StructuralDiff`] for a struct, one wire name per field.
///
/// The destructuring pattern fails to compile if a field is left out.
macro_rules! struct_diff {
    ($ty:ty { $($field:ident => $name:literal),* $(,)? }) => {
        impl StructuralDiff for $ty {
            fn diff_into(&self, other: &Self, path: &str, out: &mut Vec<String>) {
                let Self { $($field: _),* } = self;
                $( self.$field.diff_into(&other.$field, &join(path, $name), out); )*
            }
        }
    };
}

struct_diff!(Study {
    id => "id",
    version => "version",
    author_id => "authorID",
    author_name => "authorName",
    last_modified_time => "lastModifiedTime",
    enabled => "enabled",
    basic_settings => "basicSettings",
    advanced_settings => "advancedSettings",
    pages_settings => "pagesSettings",
    ui_settings => "uiSettings",
    source_post_selection_method => "sourcePostSelectionMethod",
    sources => "sources",
    posts => "posts",
});

struct_diff!(BasicSettings {
    name => "name",
    description => "description",
    prompt => "prompt",
    length => "length",
    require_reactions => "requireReactions",
    require_comments => "requireComments",
    require_identification => "requireIdentification",
    display_followers => "displayFollowers",
    display_credibility => "displayCredibility",
    display_progress => "displayProgress",
    display_number_of_reactions => "displayNumberOfReactions",
    post_enabled_reactions => "postEnabledReactions",
    comment_enabled_reactions => "commentEnabledReactions",
});

struct_diff!(AdvancedSettings {
    minimum_comment_length => "minimumCommentLength",
    prompt_delay_seconds => "promptDelaySeconds",
    react_delay_seconds => "reactDelaySeconds",
    gen_completion_code => "genCompletionCode",
    completion_code_digits => "completionCodeDigits",
    gen_random_default_avatars => "genRandomDefaultAvatars",
});

struct_diff!(PagesSettings {
    pre_intro => "preIntro",
    pre_intro_delay_seconds => "preIntroDelaySeconds",
    rules => "rules",
    rules_delay_seconds => "rulesDelaySeconds",
    post_intro => "postIntro",
    post_intro_delay_seconds => "postIntroDelaySeconds",
    debrief => "debrief",
});

struct_diff!(UiSettings {
    display_posts_in_feed => "displayPostsInFeed",
    display_followers_in_feed => "displayFollowersInFeed",
    display_credibility_in_feed => "displayCredibilityInFeed",
    labels => "labels",
});

struct_diff!(TruncatedNormal {
    mean => "mean",
    std_dev => "stdDev",
    min => "min",
    max => "max",
});

struct_diff!(Source {
    id => "id",
    name => "name",
    avatar => "avatar",
    max_posts => "maxPosts",
    followers => "followers",
    credibility => "credibility",
    true_post_percentage => "truePostPercentage",
});

struct_diff!(Post {
    id => "id",
    headline => "headline",
    content => "content",
    is_true => "isTrue",
    changes_to_followers => "changesToFollowers",
    changes_to_credibility => "changesToCredibility",
    comments => "comments",
});

struct_diff!(PostComment {
    source_name => "sourceName",
    message => "message",
    number_of_reactions => "numberOfReactions",
});

impl StructuralDiff for PostContent {
    fn diff_into(&self, other: &Self, path: &str, out: &mut Vec<String>) {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.diff_into(b, &join(path, "text"), out),
            (Self::Image(a), Self::Image(b)) => a.diff_into(b, &join(path, "image"), out),
            _ => out.push(label(path)),
        }
    }
}

impl StructuralDiff for SourcePostSelectionMethod {
    fn diff_into(&self, other: &Self, path: &str, out: &mut Vec<String>) {
        match (self, other) {
            (
                Self::OverallRatio {
                    true_post_percentage: a,
                },
                Self::OverallRatio {
                    true_post_percentage: b,
                },
            ) => a.diff_into(b, &join(path, "truePostPercentage"), out),
            (Self::SourceRatios, Self::SourceRatios) => {}
            (
                Self::Credibility {
                    slope: slope_a,
                    intercept: intercept_a,
                },
                Self::Credibility {
                    slope: slope_b,
                    intercept: intercept_b,
                },
            ) => {
                slope_a.diff_into(slope_b, &join(path, "slope"), out);
                intercept_a.diff_into(intercept_b, &join(path, "intercept"), out);
            }
            _ => out.push(label(path)),
        }
    }
}

struct_diff!(Game {
    session_id => "sessionId",
    study_id => "studyId",
    study_modified_time => "studyModifiedTime",
    started_at => "startedAt",
    finished_at => "finishedAt",
    participant => "participant",
    states => "states",
    completion_code => "completionCode",
    dismissed_prompt => "dismissedPrompt",
});

struct_diff!(Participant {
    participant_id => "participantId",
    followers => "followers",
    credibility => "credibility",
    interactions => "interactions",
});

struct_diff!(Interaction {
    post_id => "postId",
    source_id => "sourceId",
    reactions => "reactions",
    comment => "comment",
    react_delay_ms => "reactDelayMs",
});

struct_diff!(GameState {
    index => "index",
    source => "source",
    post => "post",
    participant_followers => "participantFollowers",
    participant_credibility => "participantCredibility",
});

struct_diff!(GameSource {
    source_id => "sourceId",
    followers => "followers",
    credibility => "credibility",
    remaining_posts => "remainingPosts",
});

struct_diff!(GamePost {
    post_id => "postId",
    is_true => "isTrue",
});

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn comment(name: &str) -> PostComment {
        PostComment {
            source_name: name.into(),
            message: format!("{name} says hi"),
            number_of_reactions: BTreeMap::from([(Reaction::Like, 1)]),
        }
    }

    #[test]
    fn equal_values_have_no_diff() {
        let a = vec![comment("a"), comment("b")];
        assert!(a.diff(&a.clone()).is_empty());
    }

    #[test]
    fn field_paths_use_wire_names_and_indices() {
        let a = vec![comment("a"), comment("b")];
        let mut b = a.clone();
        b[1].message = "changed".into();
        assert_eq!(a.diff(&b), vec!["[1].message".to_string()]);
    }

    #[test]
    fn reordered_sequence_is_reported_at_its_own_path() {
        let a = vec![comment("a"), comment("b"), comment("c")];
        let mut b = a.clone();
        b.reverse();
        let mut out = Vec::new();
        a.diff_into(&b, "comments", &mut out);
        assert_eq!(out, vec!["comments".to_string()]);
    }

    #[test]
    fn length_mismatch_is_reported_once() {
        let a = vec![comment("a")];
        let b = vec![comment("a"), comment("b")];
        assert_eq!(a.diff(&b), vec![ROOT_PATH.to_string()]);
    }

    #[test]
    fn keyed_maps_report_missing_and_changed_keys() {
        let a = BTreeMap::from([(Reaction::Like, 1_u32), (Reaction::Share, 2)]);
        let b = BTreeMap::from([(Reaction::Like, 5_u32), (Reaction::Flag, 2)]);
        let mut out = Vec::new();
        a.diff_into(&b, "numberOfReactions", &mut out);
        assert_eq!(
            out,
            vec![
                "numberOfReactions.like".to_string(),
                "numberOfReactions.share".to_string(),
                "numberOfReactions.flag".to_string(),
            ]
        );
    }

    #[test]
    fn sets_are_order_insensitive() {
        let a: BTreeSet<Reaction> = [Reaction::Share, Reaction::Like].into();
        let b: BTreeSet<Reaction> = [Reaction::Like, Reaction::Share].into();
        assert!(a.structurally_eq(&b));
    }

    #[test]
    fn content_variant_change_is_reported_at_content() {
        let a = PostContent::Text("x".into());
        let b = PostContent::Image(StudyImage::stored("s/p-1.png").unwrap());
        let mut out = Vec::new();
        a.diff_into(&b, "posts[0].content", &mut out);
        assert_eq!(out, vec!["posts[0].content".to_string()]);
    }

    #[test]
    fn selection_method_compares_parameters() {
        let a = SourcePostSelectionMethod::Credibility {
            slope: 1.0,
            intercept: 0.0,
        };
        let b = SourcePostSelectionMethod::Credibility {
            slope: 1.0,
            intercept: 10.0,
        };
        let mut out = Vec::new();
        a.diff_into(&b, "sourcePostSelectionMethod", &mut out);
        assert_eq!(out, vec!["sourcePostSelectionMethod.intercept".to_string()]);
    }
}
