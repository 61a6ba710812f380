use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// String identifiers supplied by the ingestion documents.
///
/// Ids are stable across chapters: the same id at two chapters denotes the same
/// logical entity at two points in narrative time.
macro_rules! define_id {
    ($name:ident, $entity:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an id, rejecting empty or whitespace-only values.
            pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(DomainError::invalid_id(concat!($entity, " id cannot be empty")));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

define_id!(CharacterId, "Character");
define_id!(SceneId, "Scene");
define_id!(EventId, "Event");

/// The unit of narrative time. Chapter 0 is the bootstrap chapter.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChapterNumber(u32);

impl ChapterNumber {
    pub const BOOTSTRAP: ChapterNumber = ChapterNumber(0);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub fn is_bootstrap(self) -> bool {
        self.0 == 0
    }

    /// The chapter this one inherits from, `None` for the bootstrap chapter.
    pub fn previous(self) -> Option<ChapterNumber> {
        self.0.checked_sub(1).map(ChapterNumber)
    }

    pub fn next(self) -> ChapterNumber {
        ChapterNumber(self.0.saturating_add(1))
    }

    /// Value as stored in the graph (Bolt integers are i64).
    pub fn as_i64(self) -> i64 {
        i64::from(self.0)
    }

    pub fn from_i64(value: i64) -> Result<Self, DomainError> {
        u32::try_from(value)
            .map(ChapterNumber)
            .map_err(|_| DomainError::parse(format!("Invalid chapter number: {}", value)))
    }
}

impl fmt::Display for ChapterNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ChapterNumber {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ids_are_rejected() {
        assert!(CharacterId::new("").is_err());
        assert!(SceneId::new("   ").is_err());
        assert!(EventId::new("e1").is_ok());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = CharacterId::new("p1").expect("valid id");
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "\"p1\"");
    }

    #[test]
    fn bootstrap_chapter_has_no_previous() {
        assert_eq!(ChapterNumber::BOOTSTRAP.previous(), None);
        assert_eq!(ChapterNumber::new(3).previous(), Some(ChapterNumber::new(2)));
    }

    #[test]
    fn negative_stored_chapter_is_a_parse_error() {
        assert!(ChapterNumber::from_i64(-1).is_err());
        assert_eq!(ChapterNumber::from_i64(7).expect("valid"), ChapterNumber::new(7));
    }
}
