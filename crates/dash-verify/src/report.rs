//! Serializable outcome of a verification run.

use serde::Serialize;

use crate::error::VerifyError;
use crate::pipeline::Verified;
use crate::stage::Stage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Report {
    Passed {
        study_id: String,
        session_id: String,
        steps: usize,
        assets_pending: usize,
    },
    Failed {
        stage: Stage,
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        diff: Option<Vec<String>>,
    },
}

impl Report {
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }
}

impl From<&Verified> for Report {
    fn from(verified: &Verified) -> Self {
        Self::Passed {
            study_id: verified.study.id.clone(),
            session_id: verified.game.session_id.clone(),
            steps: verified.game.states.len(),
            assets_pending: verified.study.images().filter(|i| i.is_pending_upload()).count(),
        }
    }
}

impl From<&VerifyError> for Report {
    fn from(err: &VerifyError) -> Self {
        let paths = err.paths();
        Self::Failed {
            stage: err.stage(),
            reason: err.to_string(),
            diff: (!paths.is_empty()).then(|| paths.into_iter().map(str::to_string).collect()),
        }
    }
}

impl From<&Result<Verified, VerifyError>> for Report {
    fn from(result: &Result<Verified, VerifyError>) -> Self {
        match result {
            Ok(verified) => verified.into(),
            Err(err) => err.into(),
        }
    }
}
