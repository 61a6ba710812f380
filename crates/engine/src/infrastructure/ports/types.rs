//! Helper types for port operations.

use serde::Serialize;
use storygraph_domain::{
    ChapterNumber, Character, Event, EventId, Relationship, Scene, SceneId,
};

/// A scene together with the chapter that asserted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredScene {
    pub chapter: ChapterNumber,
    #[serde(flatten)]
    pub scene: Scene,
}

/// An event together with the chapter that asserted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredEvent {
    pub chapter: ChapterNumber,
    #[serde(flatten)]
    pub event: Event,
}

/// A participated event as read from storage, before the per-character
/// emotional impact is extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipationRecord {
    pub event_id: EventId,
    pub event_name: Option<String>,
    pub event_order: i64,
    pub details: Option<String>,
    pub scene_id: Option<SceneId>,
    pub scene_name: Option<String>,
    pub scene_place: Option<String>,
    /// Raw stored impact mapping (JSON text), if any.
    pub emotional_impact: Option<String>,
    pub consequences: Vec<String>,
}

/// Everything written for one chapter by the versioning engine.
///
/// Backends persist it atomically: either the whole chapter lands or
/// nothing changes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChapterWrite {
    pub chapter: ChapterNumber,
    pub characters: Vec<Character>,
    pub relationships: Vec<Relationship>,
}

/// Node kinds that carry a unique identity in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Character versions, identified by `(id, chapter)`.
    CharacterVersion,
    Scene,
    Event,
}

impl NodeKind {
    pub const ALL: [NodeKind; 3] = [NodeKind::CharacterVersion, NodeKind::Scene, NodeKind::Event];

    pub fn label(self) -> &'static str {
        match self {
            NodeKind::CharacterVersion => "Character",
            NodeKind::Scene => "Scene",
            NodeKind::Event => "Event",
        }
    }

    /// Property holding the node's unique identity.
    pub fn identity_property(self) -> &'static str {
        match self {
            NodeKind::CharacterVersion => "version_key",
            NodeKind::Scene | NodeKind::Event => "id",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
