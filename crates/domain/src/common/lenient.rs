//! Lenient deserializers for chapter documents.
//!
//! Documents are produced by an external generator and are loose about
//! shapes: list fields arrive as a single string or `null`, ages arrive as
//! numbers or strings. These helpers normalize the shapes at the boundary so
//! the domain types stay strict.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn value_to_list<E: serde::de::Error>(value: Value) -> Result<Vec<String>, E> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items.into_iter().filter_map(scalar_to_string).collect()),
        Value::Object(_) => Err(E::custom("expected a list or a single value, found an object")),
        scalar => Ok(scalar_to_string(scalar).into_iter().collect()),
    }
}

/// A list that may be given as `null`, a single scalar, or an array.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null);
    value_to_list(value)
}

/// Like [`string_list`], but `null` stays distinguishable from an empty list
/// so attribute merges can tell "not supplied" from "cleared".
pub fn opt_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value_to_list(value).map(Some),
    }
}

/// A text attribute that may be given as a string or a number.
pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Value::Array(_)) | Some(Value::Object(_)) => {
            Err(D::Error::custom("expected a string or a number"))
        }
        Some(value) => Ok(scalar_to_string(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "string_list")]
        list: Vec<String>,
        #[serde(default, deserialize_with = "opt_string_list")]
        maybe: Option<Vec<String>>,
        #[serde(default, deserialize_with = "opt_string_or_number")]
        age: Option<String>,
    }

    fn probe(json: &str) -> Probe {
        serde_json::from_str(json).expect("probe should deserialize")
    }

    #[test]
    fn scalar_list_is_wrapped() {
        let p = probe(r#"{"list": "Student", "maybe": "Guild"}"#);
        assert_eq!(p.list, vec!["Student".to_string()]);
        assert_eq!(p.maybe, Some(vec!["Guild".to_string()]));
    }

    #[test]
    fn null_list_is_empty_but_null_option_is_absent() {
        let p = probe(r#"{"list": null, "maybe": null}"#);
        assert!(p.list.is_empty());
        assert_eq!(p.maybe, None);
    }

    #[test]
    fn numeric_age_becomes_text() {
        assert_eq!(probe(r#"{"age": 42}"#).age, Some("42".to_string()));
        assert_eq!(probe(r#"{"age": "thirties"}"#).age, Some("thirties".to_string()));
        assert_eq!(probe(r#"{}"#).age, None);
    }

    #[test]
    fn object_where_list_expected_is_rejected() {
        assert!(serde_json::from_str::<Probe>(r#"{"list": {"a": 1}}"#).is_err());
    }
}
