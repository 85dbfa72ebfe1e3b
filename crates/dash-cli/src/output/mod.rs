use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
        OutputFormat::Table => {
            let prefs = ui::prefs();
            let options = table::TableOptions {
                max_width: prefs.term_width,
                color: prefs.table_color,
            };
            Ok(render_table(&serde_json::to_value(value)?, options))
        }
    }
}

/// Print a serializable response to stdout in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", render(value, format)?);
    Ok(())
}

fn render_table(value: &Value, options: table::TableOptions) -> String {
    match value {
        Value::Array(items) if items.is_empty() => "(no rows)".to_string(),
        Value::Array(items) if items.iter().all(Value::is_object) => {
            // Columns in first-seen order so the caller controls the layout.
            let mut headers: Vec<&str> = Vec::new();
            for key in items.iter().filter_map(Value::as_object).flat_map(|m| m.keys()) {
                if !headers.contains(&key.as_str()) {
                    headers.push(key);
                }
            }
            let rows = items
                .iter()
                .filter_map(Value::as_object)
                .map(|map| {
                    headers
                        .iter()
                        .map(|h| map.get(*h).map_or_else(|| "-".to_string(), cell))
                        .collect()
                })
                .collect::<Vec<_>>();
            table::render(&headers, &rows, options)
        }
        Value::Array(items) => {
            let rows = items.iter().map(|item| vec![cell(item)]).collect::<Vec<_>>();
            table::render(&["value"], &rows, options)
        }
        Value::Object(map) => {
            let rows = map
                .iter()
                .map(|(key, value)| vec![key.clone(), cell(value)])
                .collect::<Vec<_>>();
            table::render(&["field", "value"], &rows, options)
        }
        scalar => table::render(&["value"], &[vec![cell(scalar)]], options),
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;
    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    struct Row {
        id: &'static str,
        enabled: bool,
    }

    const PLAIN: table::TableOptions = table::TableOptions {
        max_width: None,
        color: false,
    };

    #[test]
    fn raw_render_is_single_line_json() {
        let out = render(&Row { id: "s1", enabled: true }, OutputFormat::Raw).unwrap();
        assert!(!out.contains('\n'));
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["id"], "s1");
    }

    #[test]
    fn array_of_objects_keeps_field_order() {
        let value = json!([
            {"id": "s1", "name": "First", "enabled": true},
            {"id": "s2", "name": "Second", "enabled": false}
        ]);
        let out = render_table(&value, PLAIN);
        let header = out.lines().next().unwrap_or_default();
        let id_at = header.find("id").unwrap();
        let enabled_at = header.find("enabled").unwrap();
        assert!(id_at < enabled_at, "{header}");
        assert_eq!(out.lines().count(), 4);
    }

    #[test]
    fn string_lists_render_comma_separated() {
        let value = json!({"diff": ["posts", "sources[0].name"]});
        let out = render_table(&value, PLAIN);
        assert!(out.contains("posts, sources[0].name"));
    }

    #[test]
    fn empty_list_has_placeholder() {
        assert_eq!(render_table(&json!([]), PLAIN), "(no rows)");
    }
}
