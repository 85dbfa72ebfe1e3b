//! Deterministic construction of a [`Game`] from a [`Study`].
//!
//! The simulated participant follows a fixed policy at every decision point,
//! so the same study always yields the same session:
//!
//! - sources are chosen round-robin, skipping those that reached `maxPosts`;
//! - whether the next post is true follows the selection method's target
//!   percentage, spread evenly over the shown posts;
//! - the first unused post with the wanted truthfulness is shown, falling
//!   back to any unused post;
//! - the participant gives the first enabled reaction and, when comments are
//!   required, a comment of exactly the minimum length;
//! - follower and credibility changes take the expected value of the post's
//!   distributions.
//!
//! No randomness is involved. The completion code is derived from the
//! session id.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::entities::{
    Game, GamePost, GameSource, GameState, Interaction, Participant, Post, Source,
    SourcePostSelectionMethod, Study, TruncatedNormal,
};
use crate::errors::SimulationError;

const INITIAL_FOLLOWERS: f64 = 0.0;
const INITIAL_CREDIBILITY: f64 = 50.0;
const MAX_COMPLETION_CODE_DIGITS: u32 = 32;

/// Session id of the simulated session for `study_id`.
#[must_use]
pub fn session_id(study_id: &str) -> String {
    format!("sim-{study_id}")
}

/// Build the session the default participant policy produces for `study`.
///
/// # Errors
///
/// Returns [`SimulationError`] when the study cannot yield a complete
/// session: missing or duplicated entities, unusable distributions or
/// percentages, or a feed that runs out of sources or posts.
pub fn simulate(study: &Study) -> Result<Game, SimulationError> {
    check_study(study)?;

    let session_id = session_id(&study.id);
    let basic = &study.basic_settings;
    let advanced = &study.advanced_settings;
    let react_delay_ms = u64::from(advanced.react_delay_seconds) * 1_000;
    let reaction = basic.post_enabled_reactions.iter().next().copied();

    let mut remaining: Vec<Option<u32>> = study.sources.iter().map(Source::post_capacity).collect();
    let mut ratios = RatioTracker::new(study.sources.len());
    let mut used_posts = vec![false; study.posts.len()];
    let mut next_source = 0_usize;

    let mut participant = Participant {
        participant_id: basic.require_identification.then(|| session_id.clone()),
        followers: INITIAL_FOLLOWERS,
        credibility: INITIAL_CREDIBILITY,
        interactions: Vec::new(),
    };
    let mut states = Vec::new();
    let mut clock = study.last_modified_time;

    for step in 0..basic.length {
        let source_idx = pick_source(&remaining, next_source).ok_or_else(|| {
            SimulationError::Exhausted {
                step,
                reason: "every source has reached its maxPosts".to_string(),
            }
        })?;
        next_source = (source_idx + 1) % study.sources.len();
        let source = &study.sources[source_idx];
        if let Some(left) = remaining[source_idx].as_mut() {
            *left -= 1;
        }

        let target = target_percentage(&study.source_post_selection_method, source);
        let slot = scope(&study.source_post_selection_method, source_idx);
        let want_true = ratios.next_is_true(slot, target);
        let post_idx = pick_post(&study.posts, &used_posts, want_true).ok_or_else(|| {
            SimulationError::Exhausted {
                step,
                reason: "no unused post left".to_string(),
            }
        })?;
        used_posts[post_idx] = true;
        let post = &study.posts[post_idx];
        ratios.record(slot, post.is_true);

        let reactions: BTreeSet<_> = reaction.into_iter().collect();
        if let Some(reaction) = reaction {
            let followers = change(post.changes_to_followers.get(&reaction));
            let credibility = change(post.changes_to_credibility.get(&reaction));
            participant.followers = (participant.followers + followers).max(0.0);
            participant.credibility = (participant.credibility + credibility).clamp(0.0, 100.0);
        }

        let comment = basic.require_comments.then(|| {
            let len = usize::try_from(advanced.minimum_comment_length.max(1)).unwrap_or(1);
            "x".repeat(len)
        });

        clock = clock.saturating_add(i64::try_from(react_delay_ms).unwrap_or(i64::MAX));
        participant.interactions.push(Interaction {
            post_id: post.id.clone(),
            source_id: source.id.clone(),
            reactions,
            comment,
            react_delay_ms,
        });
        states.push(GameState {
            index: step,
            source: GameSource {
                source_id: source.id.clone(),
                followers: source.followers.expected(),
                credibility: source.credibility.expected(),
                remaining_posts: remaining[source_idx],
            },
            post: GamePost {
                post_id: post.id.clone(),
                is_true: post.is_true,
            },
            participant_followers: participant.followers,
            participant_credibility: participant.credibility,
        });
    }

    let completion_code = advanced
        .gen_completion_code
        .then(|| completion_code(&session_id, advanced.completion_code_digits));

    debug!(
        study_id = %study.id,
        steps = states.len(),
        "simulated session"
    );

    Ok(Game {
        session_id,
        study_id: study.id.clone(),
        study_modified_time: study.last_modified_time,
        started_at: study.last_modified_time,
        finished_at: clock,
        participant,
        states,
        completion_code,
        dismissed_prompt: true,
    })
}

/// Decimal completion code of `digits` characters derived from the session id.
fn completion_code(session_id: &str, digits: u32) -> String {
    let hash = blake3::hash(session_id.as_bytes());
    hash.as_bytes()
        .iter()
        .take(usize::try_from(digits).unwrap_or(0))
        .map(|byte| char::from(b'0' + byte % 10))
        .collect()
}

fn change(dist: Option<&TruncatedNormal>) -> f64 {
    dist.map_or(0.0, TruncatedNormal::expected)
}

fn pick_source(remaining: &[Option<u32>], start: usize) -> Option<usize> {
    (0..remaining.len())
        .map(|offset| (start + offset) % remaining.len())
        .find(|&idx| remaining[idx] != Some(0))
}

fn pick_post(posts: &[Post], used: &[bool], want_true: bool) -> Option<usize> {
    let unused = move || (0..posts.len()).filter(move |&idx| !used[idx]);
    unused()
        .find(|&idx| posts[idx].is_true == want_true)
        .or_else(|| unused().next())
}

fn target_percentage(method: &SourcePostSelectionMethod, source: &Source) -> f64 {
    match method {
        SourcePostSelectionMethod::OverallRatio {
            true_post_percentage,
        } => *true_post_percentage,
        SourcePostSelectionMethod::SourceRatios => source.true_post_percentage.unwrap_or(0.0),
        SourcePostSelectionMethod::Credibility { slope, intercept } => {
            slope.mul_add(source.credibility.expected(), *intercept).clamp(0.0, 100.0)
        }
    }
}

/// Counter slot a source's posts are tallied in: one shared slot for the
/// overall ratio, one per source otherwise.
const fn scope(method: &SourcePostSelectionMethod, source_idx: usize) -> usize {
    match method {
        SourcePostSelectionMethod::OverallRatio { .. } => 0,
        _ => source_idx,
    }
}

/// Spreads true posts evenly so that after `n` posts the true count is
/// `floor(n * p / 100)`.
struct RatioTracker {
    shown: Vec<u32>,
    true_shown: Vec<u32>,
}

impl RatioTracker {
    fn new(slots: usize) -> Self {
        Self {
            shown: vec![0; slots.max(1)],
            true_shown: vec![0; slots.max(1)],
        }
    }

    fn next_is_true(&self, slot: usize, percentage: f64) -> bool {
        let wanted = (f64::from(self.shown[slot] + 1) * percentage / 100.0).floor();
        wanted > f64::from(self.true_shown[slot])
    }

    fn record(&mut self, slot: usize, is_true: bool) {
        self.shown[slot] += 1;
        if is_true {
            self.true_shown[slot] += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Pre-checks
// ---------------------------------------------------------------------------

fn check_study(study: &Study) -> Result<(), SimulationError> {
    if study.sources.is_empty() {
        return Err(SimulationError::NoSources);
    }
    if study.posts.is_empty() {
        return Err(SimulationError::NoPosts);
    }

    let mut source_ids = HashSet::new();
    for source in &study.sources {
        if !source_ids.insert(source.id.as_str()) {
            return Err(SimulationError::DuplicateSourceId(source.id.clone()));
        }
    }
    let mut post_ids = HashSet::new();
    for post in &study.posts {
        if !post_ids.insert(post.id.as_str()) {
            return Err(SimulationError::DuplicatePostId(post.id.clone()));
        }
    }

    let length = study.basic_settings.length;
    if usize::try_from(length).unwrap_or(usize::MAX) > study.posts.len() {
        return Err(SimulationError::NotEnoughPosts {
            required: length,
            available: study.posts.len(),
        });
    }

    match &study.source_post_selection_method {
        SourcePostSelectionMethod::OverallRatio {
            true_post_percentage,
        } => check_percentage(
            "sourcePostSelectionMethod.truePostPercentage",
            *true_post_percentage,
        )?,
        SourcePostSelectionMethod::SourceRatios => {
            for (i, source) in study.sources.iter().enumerate() {
                let value = source.true_post_percentage.ok_or_else(|| {
                    SimulationError::MissingSourceRatio {
                        source_id: source.id.clone(),
                    }
                })?;
                check_percentage(&format!("sources[{i}].truePostPercentage"), value)?;
            }
        }
        SourcePostSelectionMethod::Credibility { slope, intercept } => {
            if !slope.is_finite() || !intercept.is_finite() {
                return Err(SimulationError::InvalidDistribution {
                    field: "sourcePostSelectionMethod".to_string(),
                    reason: "slope and intercept must be finite".to_string(),
                });
            }
        }
    }

    for (i, source) in study.sources.iter().enumerate() {
        check_distribution(&format!("sources[{i}].followers"), &source.followers)?;
        check_distribution(&format!("sources[{i}].credibility"), &source.credibility)?;
    }
    for (i, post) in study.posts.iter().enumerate() {
        for (reaction, dist) in &post.changes_to_followers {
            check_distribution(&format!("posts[{i}].changesToFollowers.{reaction}"), dist)?;
        }
        for (reaction, dist) in &post.changes_to_credibility {
            check_distribution(&format!("posts[{i}].changesToCredibility.{reaction}"), dist)?;
        }
    }

    if study.basic_settings.require_reactions
        && study.basic_settings.post_enabled_reactions.is_empty()
    {
        return Err(SimulationError::NoEnabledReactions);
    }

    let advanced = &study.advanced_settings;
    if advanced.gen_completion_code
        && !(1..=MAX_COMPLETION_CODE_DIGITS).contains(&advanced.completion_code_digits)
    {
        return Err(SimulationError::InvalidCompletionCodeDigits(
            advanced.completion_code_digits,
        ));
    }

    Ok(())
}

fn check_percentage(field: &str, value: f64) -> Result<(), SimulationError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(SimulationError::InvalidPercentage {
            field: field.to_string(),
            value,
        })
    }
}

fn check_distribution(field: &str, dist: &TruncatedNormal) -> Result<(), SimulationError> {
    dist.check()
        .map_err(|reason| SimulationError::InvalidDistribution {
            field: field.to_string(),
            reason,
        })
}
