//! Field checks shared by the resource validators.
//!
//! Each check inspects the raw JSON object and records problems into a
//! [`FieldErrors`] so that one request reports every bad field at once.
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::errors::{FieldErrors, ModelError};

pub type Fields = Map<String, Value>;

/// Required string, non-empty after trimming.
pub fn require_text(fields: &Fields, field: &str, errors: &mut FieldErrors) {
    match fields.get(field) {
        None | Some(Value::Null) => errors.push(field, "is required"),
        Some(Value::String(s)) if s.trim().is_empty() => errors.push(field, "must not be empty"),
        Some(Value::String(_)) => {}
        Some(_) => errors.push(field, "must be a string"),
    }
}

/// Optional string; when present it must be a non-empty string.
pub fn optional_text(fields: &Fields, field: &str, errors: &mut FieldErrors) {
    match fields.get(field) {
        None => {}
        Some(Value::String(s)) if s.trim().is_empty() => errors.push(field, "must not be empty"),
        Some(Value::String(_)) => {}
        Some(_) => errors.push(field, "must be a string"),
    }
}

/// Optional boolean flag.
pub fn optional_bool(fields: &Fields, field: &str, errors: &mut FieldErrors) {
    match fields.get(field) {
        None | Some(Value::Bool(_)) => {}
        Some(_) => errors.push(field, "must be a boolean"),
    }
}

/// Optional integer in `1..=u32::MAX`.
pub fn optional_positive_int(fields: &Fields, field: &str, errors: &mut FieldErrors) {
    match fields.get(field) {
        None => {}
        Some(Value::Number(n)) if n.as_u64().is_some_and(|v| v >= 1 && v <= u32::MAX as u64) => {}
        Some(_) => errors.push(field, "must be a positive integer"),
    }
}

/// Remove keys the client may not set.
pub fn strip_keys(fields: &mut Fields, keys: &[&str]) {
    for key in keys {
        fields.remove(*key);
    }
}

/// Finish validation: fail with the collected errors, otherwise deserialize
/// into the typed record (serde defaults fill omitted optional fields).
pub fn decode<T: DeserializeOwned>(fields: Fields, errors: FieldErrors) -> Result<T, ModelError> {
    errors.into_result()?;
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| ModelError::Validation(FieldErrors::single("body", e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Fields {
        match v {
            Value::Object(m) => m,
            _ => unreachable!("test input must be an object"),
        }
    }

    #[test]
    fn require_text_rejects_missing_blank_and_non_string() {
        let fields = obj(json!({"a": "  ", "b": 3, "c": null, "ok": "x"}));
        let mut errors = FieldErrors::new();
        for f in ["a", "b", "c", "missing", "ok"] {
            require_text(&fields, f, &mut errors);
        }
        assert_eq!(errors.len(), 4);
        assert!(!errors.contains_field("ok"));
    }

    #[test]
    fn optional_checks_ignore_absent_fields() {
        let fields = obj(json!({}));
        let mut errors = FieldErrors::new();
        optional_bool(&fields, "completed", &mut errors);
        optional_text(&fields, "status", &mut errors);
        optional_positive_int(&fields, "num_travelers", &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn optional_checks_reject_null_and_wrong_types() {
        let fields = obj(json!({"completed": null, "status": false, "num_travelers": 0}));
        let mut errors = FieldErrors::new();
        optional_bool(&fields, "completed", &mut errors);
        optional_text(&fields, "status", &mut errors);
        optional_positive_int(&fields, "num_travelers", &mut errors);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn positive_int_rejects_fractions_and_negatives() {
        for bad in [json!(1.5), json!(-2), json!("3")] {
            let fields = obj(json!({ "n": bad }));
            let mut errors = FieldErrors::new();
            optional_positive_int(&fields, "n", &mut errors);
            assert!(errors.contains_field("n"));
        }
    }
}
