use anyhow::Context;
use dash_publish::{ResultEntry, StudyEntry};
use serde::Serialize;
use serde_json::json;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct StudyRow<'a> {
    id: &'a str,
    state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    posts: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl<'a> From<&'a StudyEntry> for StudyRow<'a> {
    fn from(entry: &'a StudyEntry) -> Self {
        match entry {
            StudyEntry::Valid(study) => Self {
                id: &study.id,
                state: "valid",
                name: Some(&study.basic_settings.name),
                enabled: Some(study.enabled),
                posts: Some(study.posts.len()),
                last_modified_time: Some(study.last_modified_time),
                error: None,
            },
            StudyEntry::Broken { id, error, .. } => Self {
                id: id.as_deref().unwrap_or("<no id>"),
                state: "broken",
                name: None,
                enabled: None,
                posts: None,
                last_modified_time: None,
                error: Some(error),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    session_id: &'a str,
    state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    participant: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    posts_seen: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    interactions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completion_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl<'a> From<&'a ResultEntry> for ResultRow<'a> {
    fn from(entry: &'a ResultEntry) -> Self {
        match entry {
            ResultEntry::Valid(game) => Self {
                session_id: &game.session_id,
                state: "valid",
                participant: game.participant.participant_id.as_deref(),
                posts_seen: Some(game.states.len()),
                interactions: Some(game.participant.interactions.len()),
                completion_code: game.completion_code.as_deref(),
                error: None,
            },
            ResultEntry::Broken {
                id,
                participant_id,
                error,
                ..
            } => Self {
                session_id: id.as_deref().unwrap_or("<no id>"),
                state: "broken",
                participant: participant_id.as_deref(),
                posts_seen: None,
                interactions: None,
                completion_code: None,
                error: Some(error),
            },
        }
    }
}

pub async fn get(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let study = ctx
        .publisher
        .fetch_study(id)
        .await
        .with_context(|| format!("failed to get study '{id}'"))?;
    output(&study, flags.format)
}

pub async fn list(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let entries = ctx
        .publisher
        .list_studies()
        .await
        .context("failed to list studies")?;
    let rows: Vec<StudyRow<'_>> = entries.iter().map(StudyRow::from).collect();
    output(&rows, flags.format)
}

pub async fn delete(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let images = ctx
        .publisher
        .delete_study(id)
        .await
        .with_context(|| format!("failed to delete study '{id}'"))?;
    output(&json!({"id": id, "deleted": true, "images_deleted": images}), flags.format)
}

pub async fn set_enabled(
    id: &str,
    enabled: bool,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let verb = if enabled { "enable" } else { "disable" };
    let state = ctx
        .publisher
        .set_enabled(id, enabled)
        .await
        .with_context(|| format!("failed to {verb} study '{id}'"))?;
    output(&state, flags.format)
}

/// Download every recorded session of a study.
///
/// `--format raw` prints the decoded sessions; the other formats print one
/// summary row per session.
pub async fn results(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let entries = ctx
        .publisher
        .study_results(id)
        .await
        .with_context(|| format!("failed to download results of study '{id}'"))?;
    if flags.format == OutputFormat::Raw {
        return output(&entries, flags.format);
    }
    let rows: Vec<ResultRow<'_>> = entries.iter().map(ResultRow::from).collect();
    output(&rows, flags.format)
}

#[cfg(test)]
mod tests {
    use dash_core::fixtures::stored_sample_study;
    use dash_core::simulate;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn rows_for_valid_and_broken_entries() {
        let valid = StudyEntry::Valid(Box::new(stored_sample_study()));
        let broken = StudyEntry::Broken {
            id: None,
            error: "structural error at version".to_string(),
            document: json!({}),
        };

        let rows = serde_json::to_value([StudyRow::from(&valid), StudyRow::from(&broken)]).unwrap();
        assert_eq!(rows[0]["state"], "valid");
        assert_eq!(rows[0]["posts"], 3);
        assert_eq!(
            rows[1],
            json!({"id": "<no id>", "state": "broken", "error": "structural error at version"})
        );
    }

    #[test]
    fn result_rows_keep_the_participant_of_broken_sessions() {
        let game = simulate(&stored_sample_study()).unwrap();
        let valid = ResultEntry::Valid(Box::new(game));
        let broken = ResultEntry::Broken {
            id: Some("s-9".to_string()),
            participant_id: Some("P-7".to_string()),
            error: "session does not belong to study 'study-1'".to_string(),
            document: json!({}),
        };

        let rows = serde_json::to_value([ResultRow::from(&valid), ResultRow::from(&broken)]).unwrap();
        assert_eq!(rows[0]["session_id"], "sim-study-1");
        assert_eq!(rows[0]["state"], "valid");
        assert_eq!(rows[0]["posts_seen"], 3);
        assert_eq!(
            rows[1],
            json!({
                "session_id": "s-9",
                "state": "broken",
                "participant": "P-7",
                "error": "session does not belong to study 'study-1'",
            })
        );
    }
}
