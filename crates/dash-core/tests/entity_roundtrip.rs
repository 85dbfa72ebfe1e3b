//! Serde roundtrip, structural diff, and JsonSchema validation tests for the study graph.

use std::collections::BTreeMap;

use dash_core::StructuralDiff;
use dash_core::entities::*;
use dash_core::enums::Reaction;
use dash_core::fixtures::{sample_study, stored_sample_study};
use dash_core::simulate;
use schemars::schema_for;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            // Serde roundtrip
            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            // Structural diff agrees
            let diff = val.diff(&recovered);
            assert!(diff.is_empty(), "structural diff not empty: {diff:?}");

            // Schema validation
            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

roundtrip_and_validate!(study_roundtrip, Study, sample_study());

roundtrip_and_validate!(stored_study_roundtrip, Study, stored_sample_study());

roundtrip_and_validate!(
    credibility_method_study_roundtrip,
    Study,
    {
        let mut study = sample_study();
        study.source_post_selection_method = SourcePostSelectionMethod::Credibility {
            slope: 0.8,
            intercept: 10.0,
        };
        study
    }
);

roundtrip_and_validate!(game_roundtrip, Game, simulate(&sample_study()).unwrap());

roundtrip_and_validate!(
    game_with_completion_code_roundtrip,
    Game,
    {
        let mut study = sample_study();
        study.advanced_settings.gen_completion_code = true;
        study.basic_settings.require_comments = true;
        study.basic_settings.require_identification = true;
        simulate(&study).unwrap()
    }
);

roundtrip_and_validate!(
    source_without_avatar_roundtrip,
    Source,
    Source {
        id: "source-9".into(),
        name: "Anonymous".into(),
        avatar: None,
        max_posts: 2,
        followers: TruncatedNormal::fixed(0.0),
        credibility: TruncatedNormal::fixed(10.0),
        true_post_percentage: Some(25.0),
    }
);

roundtrip_and_validate!(
    text_post_roundtrip,
    Post,
    Post {
        id: "post-9".into(),
        headline: "Breaking".into(),
        content: PostContent::Text("Something happened.".into()),
        is_true: false,
        changes_to_followers: BTreeMap::from([(Reaction::Flag, TruncatedNormal::fixed(-3.0))]),
        changes_to_credibility: BTreeMap::new(),
        comments: Vec::new(),
    }
);

#[test]
fn study_schema_rejects_empty_name() {
    let schema = serde_json::to_value(schema_for!(Study)).unwrap();
    let mut instance = serde_json::to_value(stored_sample_study()).unwrap();
    instance["basicSettings"]["name"] = serde_json::json!("");
    let errors = validate_against_schema(&schema, &instance);
    assert!(!errors.is_empty());
}

#[test]
fn study_without_id_does_not_decode() {
    let mut instance = serde_json::to_value(stored_sample_study()).unwrap();
    instance.as_object_mut().unwrap().remove("id");
    let err = serde_json::from_value::<Study>(instance).unwrap_err();
    assert!(err.to_string().contains("missing field `id`"), "{err}");
}

#[test]
fn serialized_study_embeds_no_image_bytes() {
    let json = serde_json::to_string(&sample_study()).unwrap();
    assert!(!json.contains("picture"));
    assert!(json.contains("\"image\":\"study-1/post-3-"));
    assert!(json.contains("\"avatar\":\"study-1/source-1-"));
}
