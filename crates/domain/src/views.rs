//! Read-side views reconstructed from the chapter-versioned graph.

use serde::{Deserialize, Serialize};

use crate::{ChapterNumber, Character, CharacterId, EventId, Intensity, SceneId};

/// An outgoing relationship as seen from one character's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRelationship {
    /// The counterpart character.
    pub character_id: CharacterId,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub intensity: Intensity,
    pub awareness: String,
    pub detail: String,
    pub reason: String,
    pub chapter: ChapterNumber,
}

/// An event the profile's character participated in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEvent {
    pub event_id: EventId,
    pub event_name: Option<String>,
    pub event_order: i64,
    pub details: Option<String>,
    pub scene_id: Option<SceneId>,
    pub scene_name: Option<String>,
    pub scene_place: Option<String>,
    /// This character's entry of the event's impact mapping, or the
    /// "No record" sentinel.
    pub emotional_impact: String,
    pub consequences: Vec<String>,
}

/// A character's chapter-scoped view of the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub chapter: ChapterNumber,
    pub properties: Character,
    pub relationships: Vec<ProfileRelationship>,
    pub events: Vec<ProfileEvent>,
}

impl Profile {
    pub fn character_id(&self) -> &CharacterId {
        &self.properties.id
    }
}

/// A participated event recalled from an earlier chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalledEvent {
    pub chapter: ChapterNumber,
    #[serde(flatten)]
    pub event: ProfileEvent,
}

/// An event from a later chapter, used for foreshadowing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingEvent {
    pub chapter: ChapterNumber,
    pub event_id: EventId,
    pub event_name: Option<String>,
    pub details: Option<String>,
    pub event_order: i64,
}

/// Events ordered within a chapter window.
pub trait ChapterOrdered {
    fn sort_key(&self) -> (ChapterNumber, i64);
}

impl ChapterOrdered for RecalledEvent {
    fn sort_key(&self) -> (ChapterNumber, i64) {
        (self.chapter, self.event.event_order)
    }
}

impl ChapterOrdered for UpcomingEvent {
    fn sort_key(&self) -> (ChapterNumber, i64) {
        (self.chapter, self.event_order)
    }
}

/// A bounded slice of events plus how many were cut off by the limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWindow<T> {
    pub events: Vec<T>,
    pub truncated: usize,
}

impl<T: ChapterOrdered> EventWindow<T> {
    /// Sort by (chapter, order) and keep the first `limit` events.
    ///
    /// The sort is stable, so events with equal keys keep their input order.
    pub fn collect(mut events: Vec<T>, limit: usize) -> Self {
        events.sort_by_key(|e| e.sort_key());
        let truncated = events.len().saturating_sub(limit);
        events.truncate(limit);
        Self { events, truncated }
    }
}

impl<T> EventWindow<T> {
    pub fn empty() -> Self {
        Self {
            events: Vec::new(),
            truncated: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// The memory document handed to writers and exported per character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterMemory {
    pub chapter: ChapterNumber,
    pub properties: Character,
    pub relationships: Vec<ProfileRelationship>,
    pub events: Vec<ProfileEvent>,
}

impl From<Profile> for CharacterMemory {
    fn from(profile: Profile) -> Self {
        Self {
            chapter: profile.chapter,
            properties: profile.properties,
            relationships: profile.relationships,
            events: profile.events,
        }
    }
}

/// One ordered pair's edges at a chapter, for duplicate diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipCheckEntry {
    pub from_id: CharacterId,
    pub to_id: CharacterId,
    pub kinds: Vec<String>,
    pub count: usize,
}

impl RelationshipCheckEntry {
    pub fn is_duplicate(&self) -> bool {
        self.count > 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipCheckReport {
    pub chapter: ChapterNumber,
    pub entries: Vec<RelationshipCheckEntry>,
    pub duplicate_count: usize,
}

impl RelationshipCheckReport {
    pub fn new(chapter: ChapterNumber, entries: Vec<RelationshipCheckEntry>) -> Self {
        let duplicate_count = entries.iter().filter(|e| e.is_duplicate()).count();
        Self {
            chapter,
            entries,
            duplicate_count,
        }
    }
}
