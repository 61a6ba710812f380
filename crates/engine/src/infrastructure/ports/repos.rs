//! Repository port traits.
//!
//! One trait per concern. The Neo4j and in-memory backends both implement
//! every trait here.

use async_trait::async_trait;
use storygraph_domain::{
    ChapterNumber, Character, CharacterId, Event, EventId, ProfileRelationship, Relationship,
    RelationshipCheckEntry, Scene, SceneId, UpcomingEvent,
};

use super::error::RepoError;
use super::types::{ChapterWrite, NodeKind, ParticipationRecord, StoredEvent, StoredScene};

// =============================================================================
// Chapter-versioned characters and relationships
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepo: Send + Sync {
    /// The character's version at exactly `chapter`.
    async fn get_version(
        &self,
        id: &CharacterId,
        chapter: ChapterNumber,
    ) -> Result<Option<Character>, RepoError>;

    /// Every character version at `chapter`, ordered by id.
    async fn list_versions(&self, chapter: ChapterNumber) -> Result<Vec<Character>, RepoError>;

    /// The effective relationship set of `chapter`, ordered by `(from_id, to_id)`.
    async fn list_relationships(
        &self,
        chapter: ChapterNumber,
    ) -> Result<Vec<Relationship>, RepoError>;

    /// Outgoing relationships of one character at `chapter`, with counterpart names.
    async fn list_outgoing(
        &self,
        id: &CharacterId,
        chapter: ChapterNumber,
    ) -> Result<Vec<ProfileRelationship>, RepoError>;

    /// Atomically replace the chapter's relationship set and upsert its
    /// character versions.
    async fn write_chapter(&self, write: &ChapterWrite) -> Result<(), RepoError>;

    /// Edge counts per ordered pair at `chapter`, for duplicate diagnostics.
    async fn relationship_edge_counts(
        &self,
        chapter: ChapterNumber,
    ) -> Result<Vec<RelationshipCheckEntry>, RepoError>;
}

// =============================================================================
// Scenes and events
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SceneRepo: Send + Sync {
    async fn get(&self, id: &SceneId) -> Result<Option<StoredScene>, RepoError>;
    async fn save(&self, chapter: ChapterNumber, scene: &Scene) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepo: Send + Sync {
    async fn get(&self, id: &EventId) -> Result<Option<StoredEvent>, RepoError>;

    /// Save the event at `chapter` and rebuild its participation and scene links.
    ///
    /// Participants without a version at `chapter` get a stub version; a
    /// missing scene gets a stub scene.
    async fn save(&self, chapter: ChapterNumber, event: &Event) -> Result<(), RepoError>;

    /// Events at `chapter` the character participated in, ordered by
    /// `(order, id)`.
    async fn list_participated(
        &self,
        id: &CharacterId,
        chapter: ChapterNumber,
    ) -> Result<Vec<ParticipationRecord>, RepoError>;

    /// All events with `after < chapter <= through`, ordered by
    /// `(chapter, order, id)`.
    async fn list_between(
        &self,
        after: ChapterNumber,
        through: ChapterNumber,
    ) -> Result<Vec<UpcomingEvent>, RepoError>;
}

// =============================================================================
// Maintenance and schema
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MaintenanceRepo: Send + Sync {
    /// Delete every version, edge, scene and event tagged with `chapter`.
    async fn clear_chapter(&self, chapter: ChapterNumber) -> Result<(), RepoError>;
    async fn clear_all(&self) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaRepo: Send + Sync {
    /// Install uniqueness constraints and lookup indexes. Idempotent.
    async fn ensure_constraints(&self) -> Result<(), RepoError>;
}

/// Optional facility for merging nodes that share an identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DedupCapability: Send + Sync {
    async fn is_available(&self) -> bool;

    /// Merge duplicate nodes of `kind`, returning how many merged nodes remain.
    async fn merge_duplicates(&self, kind: NodeKind) -> Result<u64, RepoError>;
}

/// Dedup capability for stores that have none.
pub struct NoDedup;

#[async_trait]
impl DedupCapability for NoDedup {
    async fn is_available(&self) -> bool {
        false
    }

    async fn merge_duplicates(&self, _kind: NodeKind) -> Result<u64, RepoError> {
        Ok(0)
    }
}
