//! Central schema registry for the studydash object graph.
//!
//! The `SchemaRegistry` builds JSON Schemas from dash-core types at
//! construction time using [`schemars::schema_for!`] and validates documents
//! with `jsonschema`, reporting each violation by dotted field path.

use std::collections::HashMap;

use jsonschema::error::ValidationErrorKind;
use schemars::schema_for;
use tracing::debug;

use crate::error::{SchemaError, StructuralError, Violation};

/// Registry name of the [`dash_core::entities::Study`] schema.
pub const STUDY: &str = "study";
/// Registry name of the [`dash_core::entities::Game`] schema.
pub const GAME: &str = "game";

/// Path used for violations at the document root.
pub const ROOT_PATH: &str = dash_core::diff::ROOT_PATH;

/// Central store of the JSON Schemas in studydash.
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, serde_json::Value>,
}

/// Insert a schema into the map as a `serde_json::Value`.
macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert($name, serde_json::Value::from(schema_for!($ty)));
    };
}

impl SchemaRegistry {
    /// Build a new registry containing the study graph and game schemas.
    #[must_use]
    pub fn new() -> Self {
        let mut schemas = HashMap::new();

        register!(schemas, STUDY, dash_core::entities::Study);
        register!(schemas, GAME, dash_core::entities::Game);
        register!(schemas, "source", dash_core::entities::Source);
        register!(schemas, "post", dash_core::entities::Post);
        register!(
            schemas,
            "truncated_normal",
            dash_core::entities::TruncatedNormal
        );

        Self { schemas }
    }

    /// Get a schema by name. Returns `None` if not found.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.schemas.get(name)
    }

    /// Validate a JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown, or
    /// `SchemaError::Structural` listing every violation by field path.
    pub fn validate(&self, name: &str, instance: &serde_json::Value) -> Result<(), SchemaError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        let validator = jsonschema::validator_for(schema)
            .map_err(|e| SchemaError::Generation(format!("{e}")))?;

        let violations: Vec<Violation> = validator
            .iter_errors(instance)
            .map(|error| {
                let mut path = field_path(&error.instance_path.to_string());
                if let ValidationErrorKind::Required { property } = &error.kind {
                    let property = property
                        .as_str()
                        .map_or_else(|| property.to_string(), str::to_string);
                    path = if path == ROOT_PATH {
                        property
                    } else {
                        format!("{path}.{property}")
                    };
                }
                Violation::new(path, error.to_string())
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            debug!(schema = name, count = violations.len(), "schema validation failed");
            Err(StructuralError { violations }.into())
        }
    }

    /// List all registered schema names.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a JSON pointer (`/posts/0/content`) into a dotted field path
/// (`posts[0].content`). The empty pointer maps to [`ROOT_PATH`].
#[must_use]
pub fn field_path(pointer: &str) -> String {
    let mut out = String::new();
    for raw in pointer.split('/').skip(1) {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            out.push('[');
            out.push_str(&segment);
            out.push(']');
        } else {
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(&segment);
        }
    }
    if out.is_empty() {
        ROOT_PATH.to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dash_core::fixtures::stored_sample_study;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new()
    }

    fn study_json() -> serde_json::Value {
        serde_json::to_value(stored_sample_study()).unwrap()
    }

    fn violation_paths(err: SchemaError) -> Vec<String> {
        match err {
            SchemaError::Structural(e) => e.violations.into_iter().map(|v| v.path).collect(),
            other => panic!("expected structural error, got {other:?}"),
        }
    }

    #[test]
    fn registry_has_expected_count() {
        assert_eq!(registry().schema_count(), 5);
    }

    #[test]
    fn registry_list_is_sorted() {
        let names = registry().list();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn unknown_schema_is_not_found() {
        let err = registry()
            .validate("nope", &serde_json::json!({}))
            .unwrap_err();
        assert_eq!(err, SchemaError::NotFound("nope".into()));
    }

    #[test]
    fn valid_study_passes() {
        registry().validate(STUDY, &study_json()).unwrap();
    }

    #[test]
    fn missing_name_is_reported_by_field_path() {
        let mut doc = study_json();
        doc["basicSettings"]
            .as_object_mut()
            .unwrap()
            .remove("name");
        let err = registry().validate(STUDY, &doc).unwrap_err();
        assert_eq!(violation_paths(err), vec!["basicSettings.name".to_string()]);
    }

    #[test]
    fn empty_name_is_reported_by_field_path() {
        let mut doc = study_json();
        doc["basicSettings"]["name"] = serde_json::json!("");
        let err = registry().validate(STUDY, &doc).unwrap_err();
        assert_eq!(violation_paths(err), vec!["basicSettings.name".to_string()]);
    }

    #[test]
    fn nested_sequence_paths_use_indices() {
        let mut doc = study_json();
        doc["posts"][1]["isTrue"] = serde_json::json!("yes");
        let err = registry().validate(STUDY, &doc).unwrap_err();
        assert_eq!(violation_paths(err), vec!["posts[1].isTrue".to_string()]);
    }

    #[test]
    fn image_path_without_extension_is_rejected() {
        let mut doc = study_json();
        doc["sources"][0]["avatar"] = serde_json::json!("study-1/source-1");
        let err = registry().validate(STUDY, &doc).unwrap_err();
        assert_eq!(violation_paths(err), vec!["sources[0].avatar".to_string()]);
    }

    #[rstest]
    #[case("", "$")]
    #[case("/basicSettings/name", "basicSettings.name")]
    #[case("/posts/0/content", "posts[0].content")]
    #[case("/posts/12", "posts[12]")]
    #[case("/uiSettings/labels/a~1b", "uiSettings.labels.a/b")]
    fn pointers_become_field_paths(#[case] pointer: &str, #[case] expected: &str) {
        assert_eq!(field_path(pointer), expected);
    }
}
