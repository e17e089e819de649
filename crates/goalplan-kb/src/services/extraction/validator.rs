//! Validation of raw goal records coming out of a model reply.
//!
//! The validator never fails loudly: a record is either turned into a
//! [`GoalRecord`] or rejected with a reason the caller can log.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::data::GoalRecord;

/// Why a raw record was dropped.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("record is not an object")]
    NotAnObject,
    #[error("record has no string name")]
    MissingName,
    #[error("record name is blank")]
    BlankName,
}

pub fn validate_record(raw: &Value) -> Result<GoalRecord, Rejection> {
    let fields = raw.as_object().ok_or(Rejection::NotAnObject)?;

    let name = fields
        .get("name")
        .and_then(Value::as_str)
        .ok_or(Rejection::MissingName)?
        .trim();
    if name.is_empty() {
        return Err(Rejection::BlankName);
    }

    let depends_on = fields
        .get("depends_on")
        .and_then(Value::as_array)
        .map(|entries| {
            let mut names: Vec<String> = Vec::with_capacity(entries.len());
            for dep in entries.iter().filter_map(Value::as_str).map(str::trim) {
                // A self reference or a blank entry can never become an edge.
                if dep.is_empty() || dep == name || names.iter().any(|seen| seen == dep) {
                    continue;
                }
                names.push(dep.to_string());
            }
            names
        })
        .unwrap_or_default();

    Ok(GoalRecord {
        name: name.to_string(),
        description: text_field(fields, "description"),
        priority: text_field(fields, "priority"),
        depends_on,
    })
}

fn text_field(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_full_record() {
        let record = validate_record(&json!({
            "name": " Build Web App ",
            "description": "Develop a full-stack web application",
            "priority": "Medium",
            "depends_on": ["Learn Python"],
            "estimate": "2 weeks"
        }))
        .unwrap();

        assert_eq!(
            record,
            GoalRecord {
                name: "Build Web App".into(),
                description: "Develop a full-stack web application".into(),
                priority: "Medium".into(),
                depends_on: vec!["Learn Python".into()],
            }
        );
    }

    #[test]
    fn test_defaults_for_missing_or_mistyped_fields() {
        let record = validate_record(&json!({
            "name": "Run",
            "description": 42,
            "depends_on": "Walk"
        }))
        .unwrap();

        assert_eq!(record.description, "");
        assert_eq!(record.priority, "");
        assert!(record.depends_on.is_empty());
    }

    #[test]
    fn test_dependency_entries_are_filtered() {
        let record = validate_record(&json!({
            "name": "Run",
            "depends_on": ["Walk", 7, null, "  ", "Run", " Walk ", "Stretch"]
        }))
        .unwrap();

        assert_eq!(record.depends_on, vec!["Walk".to_string(), "Stretch".to_string()]);
    }

    #[test]
    fn test_rejections() {
        assert_eq!(validate_record(&json!("Learn X")), Err(Rejection::NotAnObject));
        assert_eq!(validate_record(&json!({"description": "x"})), Err(Rejection::MissingName));
        assert_eq!(validate_record(&json!({"name": 5})), Err(Rejection::MissingName));
        assert_eq!(validate_record(&json!({"name": "   "})), Err(Rejection::BlankName));
    }
}
