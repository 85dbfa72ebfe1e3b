//! Lossless conversion between the Study/Game graphs and plain JSON.
//!
//! Decoding always validates first, so a malformed document is reported as a
//! [`StructuralError`] naming the offending field instead of a bare serde
//! message. `id` and `version` are never defaulted.

use dash_core::entities::{Game, Study};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{SchemaError, StructuralError};
use crate::registry::{GAME, ROOT_PATH, STUDY, SchemaRegistry};

/// Converts the object graphs to and from their serialized form.
///
/// The verification pipeline takes the codec as a parameter so the
/// round-trip stages can be exercised against alternative encodings.
pub trait ConfigCodec: Send + Sync {
    /// # Errors
    ///
    /// Returns [`SchemaError::Encode`] if the study cannot be serialized.
    fn encode_study(&self, study: &Study) -> Result<serde_json::Value, SchemaError>;

    /// # Errors
    ///
    /// Returns [`SchemaError::Structural`] if the document is malformed.
    fn decode_study(&self, document: &serde_json::Value) -> Result<Study, SchemaError>;

    /// # Errors
    ///
    /// Returns [`SchemaError::Encode`] if the game cannot be serialized.
    fn encode_game(&self, game: &Game) -> Result<serde_json::Value, SchemaError>;

    /// # Errors
    ///
    /// Returns [`SchemaError::Structural`] if the document is malformed.
    fn decode_game(&self, document: &serde_json::Value) -> Result<Game, SchemaError>;
}

/// The canonical codec: serde JSON guarded by the schema registry.
#[derive(Default)]
pub struct JsonCodec {
    registry: SchemaRegistry,
}

impl JsonCodec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    fn encode<T: Serialize>(value: &T) -> Result<serde_json::Value, SchemaError> {
        serde_json::to_value(value).map_err(|e| SchemaError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(
        &self,
        schema: &str,
        document: &serde_json::Value,
    ) -> Result<T, SchemaError> {
        self.registry.validate(schema, document)?;
        T::deserialize(document)
            .map_err(|e| StructuralError::single(ROOT_PATH, e.to_string()).into())
    }
}

impl ConfigCodec for JsonCodec {
    fn encode_study(&self, study: &Study) -> Result<serde_json::Value, SchemaError> {
        Self::encode(study)
    }

    fn decode_study(&self, document: &serde_json::Value) -> Result<Study, SchemaError> {
        self.decode(STUDY, document)
    }

    fn encode_game(&self, game: &Game) -> Result<serde_json::Value, SchemaError> {
        Self::encode(game)
    }

    fn decode_game(&self, document: &serde_json::Value) -> Result<Game, SchemaError> {
        self.decode(GAME, document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dash_core::StructuralDiff;
    use dash_core::fixtures::{sample_study, stored_sample_study};
    use dash_core::simulate;
    use pretty_assertions::assert_eq;

    #[test]
    fn study_roundtrips_structurally() {
        let codec = JsonCodec::new();
        let study = sample_study();
        let doc = codec.encode_study(&study).unwrap();
        let back = codec.decode_study(&doc).unwrap();
        assert_eq!(study.diff(&back), Vec::<String>::new());
        assert!(back.pending_assets().unwrap().is_empty());
    }

    #[test]
    fn game_roundtrips_structurally() {
        let codec = JsonCodec::new();
        let game = simulate(&sample_study()).unwrap();
        let doc = codec.encode_game(&game).unwrap();
        let back = codec.decode_game(&doc).unwrap();
        assert!(game.structurally_eq(&back));
    }

    #[test]
    fn missing_version_is_not_defaulted() {
        let codec = JsonCodec::new();
        let mut doc = codec.encode_study(&stored_sample_study()).unwrap();
        doc.as_object_mut().unwrap().remove("version");
        let err = codec.decode_study(&doc).unwrap_err();
        let SchemaError::Structural(err) = err else {
            panic!("expected structural error");
        };
        assert_eq!(err.paths(), vec!["version"]);
    }

    #[test]
    fn unsupported_image_extension_fails_decode() {
        let codec = JsonCodec::new();
        let mut doc = codec.encode_study(&stored_sample_study()).unwrap();
        doc["posts"][2]["content"]["image"] = serde_json::json!("study-1/post-3.bmp");
        let err = codec.decode_study(&doc).unwrap_err();
        assert!(err.to_string().contains("unsupported image extension 'bmp'"), "{err}");
    }
}
