//! The staged verification pipeline.

use dash_core::StructuralDiff;
use dash_core::entities::{Game, Study};
use dash_core::simulate;
use dash_schema::registry::STUDY;
use dash_schema::{ConfigCodec, JsonCodec, SchemaRegistry, check_compliance};
use tracing::{debug, info};

use crate::error::VerifyError;
use crate::stage::Stage;

/// A study that passed every stage.
#[derive(Debug, Clone)]
pub struct Verified {
    pub study: Study,
    /// The encoded study, as checked by `COMPLIANCE_CHECK`.
    pub document: serde_json::Value,
    /// The simulated session.
    pub game: Game,
}

/// Runs the verification stages against one codec.
pub struct Pipeline<C = JsonCodec> {
    registry: SchemaRegistry,
    codec: C,
}

impl Default for Pipeline<JsonCodec> {
    fn default() -> Self {
        Self::new(JsonCodec::new())
    }
}

impl<C: ConfigCodec> Pipeline<C> {
    #[must_use]
    pub fn new(codec: C) -> Self {
        Self {
            registry: SchemaRegistry::new(),
            codec,
        }
    }

    #[must_use]
    pub const fn codec(&self) -> &C {
        &self.codec
    }

    /// Verify an in-memory study.
    ///
    /// # Errors
    ///
    /// Returns the [`VerifyError`] of the first stage that failed.
    pub fn verify(&self, study: &Study) -> Result<Verified, VerifyError> {
        let document = self
            .codec
            .encode_study(study)
            .map_err(|e| VerifyError::codec(Stage::TypeCheck, e))?;
        self.type_check(&document)?;
        self.run_from_roundtrip(study.clone())
    }

    /// Verify a raw study document, as read from a file or the remote store.
    ///
    /// `TYPE_CHECK` runs on the document itself, before anything is decoded.
    ///
    /// # Errors
    ///
    /// Returns the [`VerifyError`] of the first stage that failed.
    pub fn verify_document(&self, document: &serde_json::Value) -> Result<Verified, VerifyError> {
        self.type_check(document)?;
        let study = self
            .codec
            .decode_study(document)
            .map_err(|e| VerifyError::codec(Stage::TypeCheck, e))?;
        self.run_from_roundtrip(study)
    }

    fn type_check(&self, document: &serde_json::Value) -> Result<(), VerifyError> {
        debug!(stage = %Stage::TypeCheck, "verify stage");
        self.registry
            .validate(STUDY, document)
            .map_err(|e| VerifyError::codec(Stage::TypeCheck, e))
    }

    fn run_from_roundtrip(&self, study: Study) -> Result<Verified, VerifyError> {
        debug!(stage = %Stage::RoundtripCheck, "verify stage");
        let document = self
            .codec
            .encode_study(&study)
            .map_err(|e| VerifyError::codec(Stage::RoundtripCheck, e))?;
        let decoded = self
            .codec
            .decode_study(&document)
            .map_err(|e| VerifyError::codec(Stage::RoundtripCheck, e))?;
        ensure_same(Stage::RoundtripCheck, "study", &study, &decoded)?;

        debug!(stage = %Stage::ComplianceCheck, "verify stage");
        check_compliance(&document).map_err(VerifyError::Compliance)?;

        debug!(stage = %Stage::Simulate, "verify stage");
        let game = simulate(&study).map_err(VerifyError::Simulation)?;

        debug!(stage = %Stage::SimulationRoundtripCheck, "verify stage");
        let game_document = self
            .codec
            .encode_game(&game)
            .map_err(|e| VerifyError::codec(Stage::SimulationRoundtripCheck, e))?;
        let decoded_game = self
            .codec
            .decode_game(&game_document)
            .map_err(|e| VerifyError::codec(Stage::SimulationRoundtripCheck, e))?;
        ensure_same(Stage::SimulationRoundtripCheck, "game", &game, &decoded_game)?;

        info!(
            study_id = %study.id,
            steps = game.states.len(),
            "study verified"
        );
        Ok(Verified {
            study,
            document,
            game,
        })
    }
}

fn ensure_same<T: StructuralDiff>(
    stage: Stage,
    entity: &'static str,
    original: &T,
    decoded: &T,
) -> Result<(), VerifyError> {
    let paths = original.diff(decoded);
    if paths.is_empty() {
        Ok(())
    } else {
        Err(VerifyError::RoundTrip {
            stage,
            entity,
            paths,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dash_core::fixtures::sample_study;
    use pretty_assertions::assert_eq;

    #[test]
    fn sample_study_passes_every_stage() {
        let verified = Pipeline::default().verify(&sample_study()).unwrap();
        assert_eq!(verified.document["id"], "study-1");
        assert_eq!(verified.game.states.len(), 3);
        assert!(verified.study.structurally_eq(&sample_study()));
    }

    #[test]
    fn empty_name_fails_type_check() {
        let mut study = sample_study();
        study.basic_settings.name.clear();
        let err = Pipeline::default().verify(&study).unwrap_err();
        assert_eq!(err.stage(), Stage::TypeCheck);
        assert_eq!(err.paths(), vec!["basicSettings.name"]);
    }

    #[test]
    fn simulation_failure_names_the_cause() {
        let mut study = sample_study();
        study.basic_settings.length = 10;
        let err = Pipeline::default().verify(&study).unwrap_err();
        assert_eq!(err.stage(), Stage::Simulate);
        assert!(err.to_string().starts_with("SIMULATE failed: basicSettings.length"));
    }
}
