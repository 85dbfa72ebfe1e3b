//! Sample studies shared by tests across the workspace.
//!
//! Enabled for this crate's own tests and, for other crates, through the
//! `test-utils` feature.

use std::collections::{BTreeMap, BTreeSet};

use bytes::Bytes;

use crate::entities::{
    AdvancedSettings, BasicSettings, PagesSettings, Post, PostComment, PostContent, Source,
    SourcePostSelectionMethod, Study, StudyImage, TruncatedNormal, UiSettings,
};
use crate::enums::{ImageKind, Reaction};

pub const SAMPLE_STUDY_ID: &str = "study-1";

/// Study with one source carrying an avatar and three posts: two text posts
/// and one image post. Both images still carry their bytes.
#[must_use]
pub fn sample_study() -> Study {
    let avatar = StudyImage::from_bytes(
        SAMPLE_STUDY_ID,
        "source-1",
        Bytes::from_static(b"\x89PNG avatar"),
        ImageKind::Png,
    );
    let picture = StudyImage::from_bytes(
        SAMPLE_STUDY_ID,
        "post-3",
        Bytes::from_static(b"\xff\xd8 picture"),
        ImageKind::Jpeg,
    );

    Study {
        id: SAMPLE_STUDY_ID.to_string(),
        version: 1,
        author_id: "author-1".to_string(),
        author_name: "Ada Researcher".to_string(),
        last_modified_time: 1_700_000_000_000,
        enabled: true,
        basic_settings: BasicSettings {
            name: "Misinformation feed".to_string(),
            description: "Participants react to a short feed.".to_string(),
            prompt: "React to each post as you would online.".to_string(),
            length: 3,
            require_reactions: true,
            require_comments: false,
            require_identification: false,
            display_followers: true,
            display_credibility: true,
            display_progress: true,
            display_number_of_reactions: true,
            post_enabled_reactions: BTreeSet::from([Reaction::Like, Reaction::Share]),
            comment_enabled_reactions: BTreeSet::from([Reaction::Like]),
        },
        advanced_settings: AdvancedSettings {
            minimum_comment_length: 5,
            prompt_delay_seconds: 3,
            react_delay_seconds: 1,
            gen_completion_code: false,
            completion_code_digits: 6,
            gen_random_default_avatars: false,
        },
        pages_settings: PagesSettings {
            pre_intro: "Welcome.".to_string(),
            pre_intro_delay_seconds: 0,
            rules: "Be honest.".to_string(),
            rules_delay_seconds: 5,
            post_intro: "Ready?".to_string(),
            post_intro_delay_seconds: 0,
            debrief: "Thanks for taking part.".to_string(),
        },
        ui_settings: UiSettings {
            display_posts_in_feed: true,
            display_followers_in_feed: true,
            display_credibility_in_feed: false,
            labels: BTreeMap::from([("like".to_string(), "Like".to_string())]),
        },
        source_post_selection_method: SourcePostSelectionMethod::OverallRatio {
            true_post_percentage: 50.0,
        },
        sources: vec![Source {
            id: "source-1".to_string(),
            name: "Daily Bugle".to_string(),
            avatar: Some(avatar),
            max_posts: -1,
            followers: TruncatedNormal {
                mean: 1_000.0,
                std_dev: 100.0,
                min: 0.0,
                max: 5_000.0,
            },
            credibility: TruncatedNormal {
                mean: 60.0,
                std_dev: 10.0,
                min: 0.0,
                max: 100.0,
            },
            true_post_percentage: None,
        }],
        posts: vec![
            sample_post("post-1", PostContent::Text("Water is wet.".to_string()), true),
            sample_post("post-2", PostContent::Text("The moon is cheese.".to_string()), false),
            sample_post("post-3", PostContent::Image(picture), true),
        ],
    }
}

fn sample_post(id: &str, content: PostContent, is_true: bool) -> Post {
    Post {
        id: id.to_string(),
        headline: format!("Headline for {id}"),
        content,
        is_true,
        changes_to_followers: BTreeMap::from([
            (Reaction::Like, TruncatedNormal::fixed(2.0)),
            (Reaction::Share, TruncatedNormal::fixed(5.0)),
        ]),
        changes_to_credibility: BTreeMap::from([(
            Reaction::Like,
            TruncatedNormal {
                mean: if is_true { 1.0 } else { -1.0 },
                std_dev: 0.5,
                min: -5.0,
                max: 5.0,
            },
        )]),
        comments: vec![PostComment {
            source_name: "bystander".to_string(),
            message: format!("Comment on {id}"),
            number_of_reactions: BTreeMap::from([(Reaction::Like, 4)]),
        }],
    }
}

/// The sample study as stored remotely: every image is a path reference.
#[must_use]
pub fn stored_sample_study() -> Study {
    let mut study = sample_study();
    study.mark_assets_stored();
    study
}
