use dash_core::entities::{Game, Study};
use serde::Serialize;

/// One study document returned by a listing.
///
/// A document that fails to decode is kept as `Broken` so one bad study
/// does not hide the others.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StudyEntry {
    Valid(Box<Study>),
    Broken {
        id: Option<String>,
        error: String,
        document: serde_json::Value,
    },
}

impl StudyEntry {
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Valid(study) => Some(&study.id),
            Self::Broken { id, .. } => id.as_deref(),
        }
    }

    #[must_use]
    pub fn study(&self) -> Option<&Study> {
        match self {
            Self::Valid(study) => Some(study),
            Self::Broken { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_broken(&self) -> bool {
        matches!(self, Self::Broken { .. })
    }
}

/// One recorded session of a study.
///
/// A result that does not decode, or that refers to posts or sources the
/// study does not define, is kept as `Broken` with the participant it
/// belongs to when that can still be read.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResultEntry {
    Valid(Box<Game>),
    Broken {
        id: Option<String>,
        participant_id: Option<String>,
        error: String,
        document: serde_json::Value,
    },
}

impl ResultEntry {
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Valid(game) => Some(&game.session_id),
            Self::Broken { id, .. } => id.as_deref(),
        }
    }

    #[must_use]
    pub fn game(&self) -> Option<&Game> {
        match self {
            Self::Valid(game) => Some(game),
            Self::Broken { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_broken(&self) -> bool {
        matches!(self, Self::Broken { .. })
    }
}
