use dash_core::SimulationError;
use dash_schema::{ComplianceError, SchemaError, StructuralError};
use thiserror::Error;

use crate::stage::Stage;

/// Why a study failed verification. Every message starts with the stage.
#[derive(Debug, Clone, Error)]
pub enum VerifyError {
    #[error("TYPE_CHECK failed: {0}")]
    Structural(StructuralError),

    /// The decoded value differs from the original at `paths`.
    #[error("{stage} failed: {entity} does not round-trip, differing fields: {}", .paths.join(", "))]
    RoundTrip {
        stage: Stage,
        entity: &'static str,
        paths: Vec<String>,
    },

    #[error("COMPLIANCE_CHECK failed: {0}")]
    Compliance(ComplianceError),

    #[error("SIMULATE failed: {0}")]
    Simulation(SimulationError),

    /// The codec could not encode or decode a value it produced itself.
    #[error("{stage} failed: {source}")]
    Codec { stage: Stage, source: SchemaError },
}

impl VerifyError {
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Structural(_) => Stage::TypeCheck,
            Self::Compliance(_) => Stage::ComplianceCheck,
            Self::Simulation(_) => Stage::Simulate,
            Self::RoundTrip { stage, .. } | Self::Codec { stage, .. } => *stage,
        }
    }

    /// Field paths that explain the failure, when the stage produces them.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        match self {
            Self::Structural(err) => err.paths(),
            Self::Compliance(err) => err.paths(),
            Self::RoundTrip { paths, .. } => paths.iter().map(String::as_str).collect(),
            Self::Simulation(_) | Self::Codec { .. } => Vec::new(),
        }
    }

    /// Attribute a codec failure to `stage`, keeping schema violations structural.
    pub(crate) fn codec(stage: Stage, err: SchemaError) -> Self {
        match err {
            SchemaError::Structural(structural) if stage == Stage::TypeCheck => {
                Self::Structural(structural)
            }
            other => Self::Codec {
                stage,
                source: other,
            },
        }
    }
}
