//! Domain model for the chapter-versioned story graph.
//!
//! Pure data and rules: no I/O, no async. The engine crate owns persistence.

pub mod common;
pub mod document;
pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;
pub mod views;

pub use document::ChapterDocument;
pub use entities::{Character, Event, Relationship, RelationshipKey, Scene, UNSPECIFIED_TIME_PERIOD};
pub use error::DomainError;
pub use ids::{ChapterNumber, CharacterId, EventId, SceneId};
pub use value_objects::{EmotionalImpact, Intensity, NO_IMPACT_RECORD};
pub use views::{
    ChapterOrdered, CharacterMemory, EventWindow, Profile, ProfileEvent, ProfileRelationship,
    RecalledEvent, RelationshipCheckEntry, RelationshipCheckReport, UpcomingEvent,
};
