//! Directed, typed relationships between characters.
//!
//! Override identity is the ordered pair `(from_id, to_id)`, not the type: a
//! chapter that asserts `A -> B` replaces whatever `A -> B` edge it inherited.

use serde::{Deserialize, Serialize};

use crate::{ChapterNumber, CharacterId, Intensity};

fn default_awareness() -> String {
    "Unknown".to_string()
}

/// A relationship edge as asserted (or inherited) at a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub from_id: CharacterId,
    pub to_id: CharacterId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub intensity: Intensity,
    #[serde(default = "default_awareness")]
    pub awareness: String,
    #[serde(default, alias = "new_detail")]
    pub detail: String,
    #[serde(default)]
    pub reason: String,
    /// Chapter this edge was asserted at, or carried forward to.
    #[serde(default)]
    pub chapter: ChapterNumber,
}

impl Relationship {
    pub fn new(from_id: CharacterId, to_id: CharacterId, kind: impl Into<String>) -> Self {
        Self {
            from_id,
            to_id,
            kind: kind.into(),
            intensity: Intensity::default(),
            awareness: default_awareness(),
            detail: String::new(),
            reason: String::new(),
            chapter: ChapterNumber::BOOTSTRAP,
        }
    }

    pub fn with_intensity(mut self, intensity: Intensity) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn with_awareness(mut self, awareness: impl Into<String>) -> Self {
        self.awareness = awareness.into();
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn at_chapter(mut self, chapter: ChapterNumber) -> Self {
        self.chapter = chapter;
        self
    }

    pub fn key(&self) -> RelationshipKey {
        RelationshipKey::new(self.from_id.clone(), self.to_id.clone())
    }
}

/// Ordered `(from_id, to_id)` pair identifying a relationship for override.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationshipKey {
    pub from_id: CharacterId,
    pub to_id: CharacterId,
}

impl RelationshipKey {
    pub fn new(from_id: CharacterId, to_id: CharacterId) -> Self {
        Self { from_id, to_id }
    }
}

impl std::fmt::Display for RelationshipKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.from_id, self.to_id)
    }
}
