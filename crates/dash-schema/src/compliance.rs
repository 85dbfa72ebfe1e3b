//! Compliance walk over a serialized document.
//!
//! A serialized study or game must consist of plain JSON only: an object at
//! the root, and leaves that any JSON consumer reads back unchanged. The walk
//! flags:
//!
//! - a root that is not an object;
//! - integers outside the exactly representable range `±(2^53 - 1)`;
//! - binary content that leaked into the document instead of being referenced
//!   by asset path: any `data:` URI in an image field (`avatar`, `image`),
//!   and a base64 `data:` URI anywhere else.
//!
//! Other strings are plain text, even when they happen to start with `data:`.

use serde_json::Value;

use crate::error::{ComplianceError, Violation};
use crate::registry::ROOT_PATH;

/// Keys whose string values are asset paths.
const IMAGE_FIELDS: [&str; 2] = ["avatar", "image"];

/// Largest integer every JSON consumer represents exactly.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Walk `document` and collect every non-compliant leaf.
///
/// # Errors
///
/// Returns [`ComplianceError`] naming each offending path.
pub fn check_compliance(document: &Value) -> Result<(), ComplianceError> {
    let mut violations = Vec::new();
    if document.is_object() {
        walk(document, "", None, &mut violations);
    } else {
        violations.push(Violation::new(ROOT_PATH, "document root must be an object"));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ComplianceError { violations })
    }
}

fn walk(value: &Value, path: &str, key: Option<&str>, out: &mut Vec<Violation>) {
    match value {
        Value::Null | Value::Bool(_) => {}
        Value::Number(n) => {
            let unsafe_int = n.as_i64().map_or_else(
                || n.as_u64().is_some_and(|u| u > MAX_SAFE_INTEGER),
                |i| i.unsigned_abs() > MAX_SAFE_INTEGER,
            );
            if unsafe_int {
                out.push(Violation::new(
                    display(path),
                    format!("integer {n} is outside the exactly representable range"),
                ));
            }
        }
        Value::String(s) => {
            let image_field = key.is_some_and(|key| IMAGE_FIELDS.contains(&key));
            if is_inline_binary(s, image_field) {
                out.push(Violation::new(
                    display(path),
                    "inline binary data; binary content must be referenced by asset path",
                ));
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                walk(item, &format!("{path}[{i}]"), key, out);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                walk(item, &child, Some(key.as_str()), out);
            }
        }
    }
}

/// `data:[<mediatype>][;base64],<data>` with no whitespace before the comma.
///
/// Outside image fields only the `;base64` form counts.
fn is_inline_binary(s: &str, image_field: bool) -> bool {
    let has_scheme = s
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"));
    if !has_scheme {
        return false;
    }
    let Some((media, _)) = s.get(5..).and_then(|rest| rest.split_once(',')) else {
        return false;
    };
    if media.contains(char::is_whitespace) {
        return false;
    }
    image_field || media.to_ascii_lowercase().ends_with(";base64")
}

fn display(path: &str) -> String {
    if path.is_empty() {
        ROOT_PATH.to_string()
    } else {
        path.to_string()
    }
}
