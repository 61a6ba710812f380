//! Per-participant emotional impact of an event.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{CharacterId, DomainError};

/// Sentinel reported when an event holds no impact entry for a character.
pub const NO_IMPACT_RECORD: &str = "No record";

/// Mapping from participant id to a textual effect ("anxious", "relieved").
///
/// Stored in the graph as a JSON string, since property maps cannot be
/// nested on a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EmotionalImpact(BTreeMap<CharacterId, String>);

impl EmotionalImpact {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, character_id: CharacterId, effect: impl Into<String>) -> Self {
        self.0.insert(character_id, effect.into());
        self
    }

    pub fn get(&self, character_id: &CharacterId) -> Option<&str> {
        self.0.get(character_id).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Storage representation: a JSON object string.
    pub fn to_storage(&self) -> Result<String, DomainError> {
        serde_json::to_string(&self.0)
            .map_err(|e| DomainError::parse(format!("Unserializable emotional impact: {}", e)))
    }

    /// Parse the storage representation. An empty string is an empty mapping.
    pub fn from_storage(stored: &str) -> Result<Self, DomainError> {
        if stored.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_str(stored)
            .map_err(|e| DomainError::parse(format!("Invalid emotional impact JSON: {}", e)))?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self, DomainError> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::String(s) => Self::from_storage(&s),
            Value::Object(map) => {
                let mut entries = BTreeMap::new();
                for (key, effect) in map {
                    let id = CharacterId::new(key)?;
                    let effect = match effect {
                        Value::String(s) => s,
                        Value::Null => continue,
                        other => other.to_string(),
                    };
                    entries.insert(id, effect);
                }
                Ok(Self(entries))
            }
            other => Err(DomainError::parse(format!(
                "Emotional impact must be an object keyed by character id, got {}",
                other
            ))),
        }
    }

    /// Look up one character's entry in a stored mapping.
    ///
    /// `Ok(None)` when the mapping has no entry for the character, `Err` when
    /// the stored text is not a mapping at all.
    pub fn lookup_stored(
        stored: Option<&str>,
        character_id: &CharacterId,
    ) -> Result<Option<String>, DomainError> {
        match stored {
            None => Ok(None),
            Some(text) => {
                let impact = Self::from_storage(text)?;
                Ok(impact.get(character_id).map(str::to_string))
            }
        }
    }
}

/// Documents may carry the mapping as an object, as an already-encoded JSON
/// string, or as `null`.
impl<'de> Deserialize<'de> for EmotionalImpact {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null);
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}

impl FromIterator<(CharacterId, String)> for EmotionalImpact {
    fn from_iter<T: IntoIterator<Item = (CharacterId, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> CharacterId {
        CharacterId::new(s).expect("valid id")
    }

    #[test]
    fn storage_representation_round_trips_entries() {
        let impact = EmotionalImpact::new()
            .with_entry(id("A"), "anxious")
            .with_entry(id("B"), "confident");
        let stored = impact.to_storage().expect("serialize");
        assert_eq!(stored, r#"{"A":"anxious","B":"confident"}"#);

        assert_eq!(
            EmotionalImpact::lookup_stored(Some(&stored), &id("B")).expect("lookup"),
            Some("confident".to_string())
        );
        assert_eq!(
            EmotionalImpact::lookup_stored(Some(&stored), &id("C")).expect("lookup"),
            None
        );
    }

    #[test]
    fn malformed_storage_is_an_error() {
        assert!(EmotionalImpact::lookup_stored(Some("not json"), &id("A")).is_err());
        assert!(EmotionalImpact::lookup_stored(Some("[1,2]"), &id("A")).is_err());
    }

    #[test]
    fn accepts_encoded_string_in_documents() {
        let impact: EmotionalImpact =
            serde_json::from_str(r#""{\"p1\": \"Anxious\"}""#).expect("deserialize");
        assert_eq!(impact.get(&id("p1")), Some("Anxious"));
    }

    #[test]
    fn empty_storage_is_empty_mapping() {
        assert!(EmotionalImpact::from_storage("").expect("parse").is_empty());
        assert!(EmotionalImpact::from_storage("{}").expect("parse").is_empty());
    }
}
