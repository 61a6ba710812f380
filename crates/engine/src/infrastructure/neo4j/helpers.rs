//! Neo4j deserialization helpers for row conversion functions.
//!
//! Extension methods shared by nodes and rows, so repositories can read
//! either `RETURN n` or `RETURN n.prop AS prop` results the same way.

use anyhow::{Context, Result};
use neo4rs::{Node, Row};
use storygraph_domain::common::StringExt;
use storygraph_domain::ChapterNumber;

use crate::infrastructure::ports::RepoError;

/// Extension trait for Neo4j property containers (nodes and rows).
pub trait PropertyExt {
    /// Get an optional string field, returning None if empty, null or missing.
    fn get_optional_string(&self, field: &str) -> Option<String>;

    /// Get a string field with a default value if missing.
    fn get_string_or(&self, field: &str, default: &str) -> String;

    /// Get an i64 field with a default value if missing or null.
    fn get_i64_or(&self, field: &str, default: i64) -> i64;

    /// Get a list of strings, empty if missing or null.
    fn get_string_list(&self, field: &str) -> Vec<String>;

    /// Get a required string field (fail-fast).
    fn get_string_strict(&self, field: &str) -> Result<String, RepoError>;

    /// Get a required i64 field (fail-fast).
    fn get_i64_strict(&self, field: &str) -> Result<i64, RepoError>;

    /// Get a required chapter tag (fail-fast).
    fn get_chapter(&self, field: &str) -> Result<ChapterNumber, RepoError>;

    /// Get and deserialize a required JSON string field.
    fn get_json<T: serde::de::DeserializeOwned>(&self, field: &str) -> Result<T>;
}

macro_rules! impl_property_ext {
    ($target:ty) => {
        impl PropertyExt for $target {
            fn get_optional_string(&self, field: &str) -> Option<String> {
                self.get::<String>(field).ok().and_then(|s| s.into_option())
            }

            fn get_string_or(&self, field: &str, default: &str) -> String {
                self.get(field).unwrap_or_else(|_| default.to_string())
            }

            fn get_i64_or(&self, field: &str, default: i64) -> i64 {
                self.get(field).unwrap_or(default)
            }

            fn get_string_list(&self, field: &str) -> Vec<String> {
                self.get::<Vec<String>>(field).unwrap_or_default()
            }

            fn get_string_strict(&self, field: &str) -> Result<String, RepoError> {
                self.get(field).map_err(|e| {
                    RepoError::database(
                        "query",
                        format!("Missing required field '{}': {}", field, e),
                    )
                })
            }

            fn get_i64_strict(&self, field: &str) -> Result<i64, RepoError> {
                self.get(field).map_err(|e| {
                    RepoError::database(
                        "query",
                        format!("Missing required field '{}': {}", field, e),
                    )
                })
            }

            fn get_chapter(&self, field: &str) -> Result<ChapterNumber, RepoError> {
                let raw = self.get_i64_strict(field)?;
                ChapterNumber::from_i64(raw).map_err(RepoError::from)
            }

            fn get_json<T: serde::de::DeserializeOwned>(&self, field: &str) -> Result<T> {
                let s: String = self
                    .get(field)
                    .with_context(|| format!("Missing field: {}", field))?;
                serde_json::from_str(&s)
                    .with_context(|| format!("Invalid JSON in field '{}': {}", field, s))
            }
        }
    };
}

impl_property_ext!(Node);
impl_property_ext!(Row);

/// Fetch the node bound to `column` in a row.
pub fn node_column(row: &Row, column: &str) -> Result<Node, RepoError> {
    row.get(column)
        .map_err(|e| RepoError::database("query", format!("Missing column '{}': {}", column, e)))
}
