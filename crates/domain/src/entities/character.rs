//! Character entity - a person in the narrative world
//!
//! A character is versioned per chapter. Each chapter's version is the previous
//! version with that chapter's attribute updates merged in, so an update only
//! has to carry the fields that changed ("health: wounded").

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::common::lenient;
use crate::CharacterId;

/// Attributes of a character as asserted by a chapter document.
///
/// Every attribute except `id` is optional: `None` means "not supplied", which
/// a merge treats as "keep the previous value".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub aliases: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub age: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub occupation: Option<Vec<String>>,
    #[serde(
        default,
        alias = "affiliations",
        deserialize_with = "lenient::opt_string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub affiliation: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,
    #[serde(
        default,
        alias = "health_status",
        alias = "status",
        skip_serializing_if = "Option::is_none"
    )]
    pub health: Option<String>,
    /// Attributes outside the core schema, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Character {
    pub fn new(id: CharacterId) -> Self {
        Self {
            id,
            name: None,
            aliases: None,
            gender: None,
            age: None,
            occupation: None,
            affiliation: None,
            personality: None,
            health: None,
            extra: BTreeMap::new(),
        }
    }

    // Builder methods

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn with_age(mut self, age: impl Into<String>) -> Self {
        self.age = Some(age.into());
        self
    }

    pub fn with_occupation(mut self, occupation: Vec<String>) -> Self {
        self.occupation = Some(occupation);
        self
    }

    pub fn with_affiliation(mut self, affiliation: Vec<String>) -> Self {
        self.affiliation = Some(affiliation);
        self
    }

    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = Some(personality.into());
        self
    }

    pub fn with_health(mut self, health: impl Into<String>) -> Self {
        self.health = Some(health.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Display name, falling back to the id for characters known only by id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }

    /// Merge a later assertion of the same character into this one.
    ///
    /// Supplied fields override; absent fields keep their current value.
    /// Extra attributes merge key by key.
    pub fn merge(&mut self, update: Character) {
        debug_assert_eq!(self.id, update.id, "merging different characters");

        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.name, update.name);
        take(&mut self.aliases, update.aliases);
        take(&mut self.gender, update.gender);
        take(&mut self.age, update.age);
        take(&mut self.occupation, update.occupation);
        take(&mut self.affiliation, update.affiliation);
        take(&mut self.personality, update.personality);
        take(&mut self.health, update.health);
        self.extra.extend(update.extra);
    }

    /// Return a copy with `update` merged in.
    pub fn merged(mut self, update: Character) -> Self {
        self.merge(update);
        self
    }
}
