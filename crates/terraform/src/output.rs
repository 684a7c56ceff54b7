//! Decoding of `terraform output -json`.
//!
//! Single outputs are flattened to strings the way a test compares them:
//! JSON strings are unquoted, booleans and numbers keep their literal text,
//! `null` becomes empty, anything else stays compact JSON.

use std::collections::BTreeMap;

use serde_json::Value;

use idc_verify_core::types::{OutputSet, OutputValue};

use crate::error::TerraformError;

/// Decodes `terraform output -json <name>` into a string.
pub fn decode_text(name: &str, raw: &str) -> Result<String, TerraformError> {
    let value = parse(name, raw)?;
    Ok(value_to_string(&value))
}

/// Decodes `terraform output -json <name>` into a flat string map.
pub fn decode_map(name: &str, raw: &str) -> Result<BTreeMap<String, String>, TerraformError> {
    match parse(name, raw)? {
        Value::Object(fields) => Ok(fields
            .iter()
            .map(|(key, value)| (key.clone(), value_to_string(value)))
            .collect()),
        _ => Err(TerraformError::NotAMap {
            name: name.to_owned(),
        }),
    }
}

/// Decodes `terraform output -json` (all outputs).
///
/// Each entry has the shape `{"sensitive": bool, "type": ..., "value": ...}`.
pub fn decode_all(raw: &str) -> Result<OutputSet, TerraformError> {
    let entries = match parse("*", raw)? {
        Value::Object(entries) => entries,
        _ => {
            return Err(TerraformError::OutputDecode {
                name: "*".to_owned(),
                reason: "expected a JSON object of outputs".to_owned(),
            });
        }
    };

    let mut set = OutputSet::new();
    for (name, entry) in entries {
        let value = entry.get("value").cloned().unwrap_or(Value::Null);
        let decoded = match value {
            Value::Object(fields) => OutputValue::Map(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), value_to_string(value)))
                    .collect(),
            ),
            other => OutputValue::Text(value_to_string(&other)),
        };
        set.insert(name, decoded);
    }
    Ok(set)
}

fn parse(name: &str, raw: &str) -> Result<Value, TerraformError> {
    serde_json::from_str(raw.trim()).map_err(|e| TerraformError::OutputDecode {
        name: name.to_owned(),
        reason: e.to_string(),
    })
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_output_reads_as_literal() {
        assert_eq!(decode_text("test_success_1", "true\n").unwrap(), "true");
    }

    #[test]
    fn string_output_is_unquoted() {
        assert_eq!(decode_text("test_success_2", "\"true\"").unwrap(), "true");
    }

    #[test]
    fn null_output_is_empty() {
        assert_eq!(decode_text("x", "null").unwrap(), "");
    }

    #[test]
    fn list_output_stays_json() {
        assert_eq!(decode_text("ids", "[\"a\", \"b\"]").unwrap(), r#"["a","b"]"#);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode_text("x", "Warning: No outputs found").unwrap_err();
        assert!(matches!(err, TerraformError::OutputDecode { ref name, .. } if name == "x"));
    }

    #[test]
    fn map_output_flattens_numbers() {
        let raw = r#"{"statusCode": 200, "body": "{\"accounts\": {}}"}"#;
        let map = decode_map("idc_report", raw).unwrap();
        assert_eq!(map["statusCode"], "200");
        assert_eq!(map["body"], r#"{"accounts": {}}"#);
    }

    #[test]
    fn map_output_rejects_scalars() {
        let err = decode_map("idc_report", "\"200\"").unwrap_err();
        assert!(matches!(err, TerraformError::NotAMap { .. }));
    }

    #[test]
    fn decode_all_handles_mixed_outputs() {
        let raw = r#"{
            "test_success_1": {"sensitive": false, "type": "bool", "value": true},
            "idc_report": {
                "sensitive": false,
                "type": ["object", {"statusCode": "number"}],
                "value": {"statusCode": 200}
            },
            "secret": {"sensitive": true, "type": "string", "value": "s3cr3t"}
        }"#;
        let set = decode_all(raw).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(
            set.get("test_success_1"),
            Some(&OutputValue::Text("true".to_owned()))
        );
        assert_eq!(
            set.get("idc_report")
                .and_then(OutputValue::as_map)
                .map(|m| m["statusCode"].as_str()),
            Some("200")
        );
    }

    #[test]
    fn decode_all_empty_object() {
        assert!(decode_all("{}").unwrap().is_empty());
    }

    #[test]
    fn decode_all_rejects_non_object() {
        assert!(decode_all("[]").is_err());
    }
}
