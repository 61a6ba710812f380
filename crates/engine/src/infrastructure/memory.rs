//! In-process chapter-versioned store.
//!
//! Implements every repository port over plain maps behind one `RwLock`, so a
//! chapter write is a single critical section. Used by the test suite and by
//! `STORYGRAPH_BACKEND=memory`.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use storygraph_domain::{
    ChapterNumber, Character, CharacterId, Event, EventId, ProfileRelationship, Relationship,
    RelationshipCheckEntry, RelationshipKey, Scene, SceneId, UpcomingEvent,
};
use tokio::sync::RwLock;

use crate::infrastructure::ports::{
    ChapterWrite, CharacterRepo, EventRepo, MaintenanceRepo, ParticipationRecord, RepoError,
    SceneRepo, SchemaRepo, StoredEvent, StoredScene,
};

#[derive(Default)]
struct GraphState {
    /// Character versions keyed by id, then chapter.
    characters: HashMap<CharacterId, BTreeMap<ChapterNumber, Character>>,
    /// Effective relationship set per chapter; one entry per ordered pair.
    relationships: BTreeMap<ChapterNumber, BTreeMap<RelationshipKey, Relationship>>,
    scenes: HashMap<SceneId, StoredScene>,
    events: HashMap<EventId, StoredEvent>,
}

impl GraphState {
    fn version(&self, id: &CharacterId, chapter: ChapterNumber) -> Option<&Character> {
        self.characters.get(id).and_then(|versions| versions.get(&chapter))
    }

    fn upsert_version(&mut self, chapter: ChapterNumber, character: Character) {
        self.characters
            .entry(character.id.clone())
            .or_default()
            .insert(chapter, character);
    }

    fn in_event_at(&self, id: &CharacterId, chapter: ChapterNumber) -> bool {
        self.events
            .values()
            .any(|stored| stored.chapter == chapter && stored.event.involves(id))
    }

    /// Drop `chapter` versions not in `keep`, except event participants.
    fn remove_versions_except(&mut self, chapter: ChapterNumber, keep: &HashSet<&CharacterId>) {
        let stale: Vec<CharacterId> = self
            .characters
            .iter()
            .filter(|(id, versions)| {
                versions.contains_key(&chapter)
                    && !keep.contains(id)
                    && !self.in_event_at(id, chapter)
            })
            .map(|(id, _)| id.clone())
            .collect();

        for id in stale {
            if let Some(versions) = self.characters.get_mut(&id) {
                versions.remove(&chapter);
                if versions.is_empty() {
                    self.characters.remove(&id);
                }
            }
        }
    }
}

/// Versioned graph held in process memory.
#[derive(Default)]
pub struct InMemoryGraph {
    state: RwLock<GraphState>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CharacterRepo for InMemoryGraph {
    async fn get_version(
        &self,
        id: &CharacterId,
        chapter: ChapterNumber,
    ) -> Result<Option<Character>, RepoError> {
        Ok(self.state.read().await.version(id, chapter).cloned())
    }

    async fn list_versions(&self, chapter: ChapterNumber) -> Result<Vec<Character>, RepoError> {
        let state = self.state.read().await;
        let mut versions: Vec<Character> = state
            .characters
            .values()
            .filter_map(|versions| versions.get(&chapter).cloned())
            .collect();
        versions.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(versions)
    }

    async fn list_relationships(
        &self,
        chapter: ChapterNumber,
    ) -> Result<Vec<Relationship>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .relationships
            .get(&chapter)
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_outgoing(
        &self,
        id: &CharacterId,
        chapter: ChapterNumber,
    ) -> Result<Vec<ProfileRelationship>, RepoError> {
        let state = self.state.read().await;
        let Some(set) = state.relationships.get(&chapter) else {
            return Ok(Vec::new());
        };

        Ok(set
            .values()
            .filter(|rel| &rel.from_id == id)
            .map(|rel| ProfileRelationship {
                character_id: rel.to_id.clone(),
                name: state
                    .version(&rel.to_id, chapter)
                    .and_then(|c| c.name.clone()),
                kind: rel.kind.clone(),
                intensity: rel.intensity,
                awareness: rel.awareness.clone(),
                detail: rel.detail.clone(),
                reason: rel.reason.clone(),
                chapter: rel.chapter,
            })
            .collect())
    }

    async fn write_chapter(&self, write: &ChapterWrite) -> Result<(), RepoError> {
        let mut state = self.state.write().await;

        let keep: HashSet<&CharacterId> = write.characters.iter().map(|c| &c.id).collect();
        state.remove_versions_except(write.chapter, &keep);
        for character in &write.characters {
            state.upsert_version(write.chapter, character.clone());
        }

        let set: BTreeMap<RelationshipKey, Relationship> = write
            .relationships
            .iter()
            .map(|rel| (rel.key(), rel.clone()))
            .collect();
        state.relationships.insert(write.chapter, set);

        Ok(())
    }

    async fn relationship_edge_counts(
        &self,
        chapter: ChapterNumber,
    ) -> Result<Vec<RelationshipCheckEntry>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .relationships
            .get(&chapter)
            .map(|set| {
                set.values()
                    .map(|rel| RelationshipCheckEntry {
                        from_id: rel.from_id.clone(),
                        to_id: rel.to_id.clone(),
                        kinds: vec![rel.kind.clone()],
                        count: 1,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl SceneRepo for InMemoryGraph {
    async fn get(&self, id: &SceneId) -> Result<Option<StoredScene>, RepoError> {
        Ok(self.state.read().await.scenes.get(id).cloned())
    }

    async fn save(&self, chapter: ChapterNumber, scene: &Scene) -> Result<(), RepoError> {
        self.state.write().await.scenes.insert(
            scene.id.clone(),
            StoredScene {
                chapter,
                scene: scene.clone(),
            },
        );
        Ok(())
    }
}

#[async_trait]
impl EventRepo for InMemoryGraph {
    async fn get(&self, id: &EventId) -> Result<Option<StoredEvent>, RepoError> {
        Ok(self.state.read().await.events.get(id).cloned())
    }

    async fn save(&self, chapter: ChapterNumber, event: &Event) -> Result<(), RepoError> {
        let mut state = self.state.write().await;

        for participant in &event.participants {
            if state.version(participant, chapter).is_none() {
                state.upsert_version(chapter, Character::new(participant.clone()));
            }
        }

        if let Some(scene_id) = &event.scene_id {
            state
                .scenes
                .entry(scene_id.clone())
                .or_insert_with(|| StoredScene {
                    chapter,
                    scene: Scene::new(scene_id.clone()).with_defaults(),
                });
        }

        state.events.insert(
            event.id.clone(),
            StoredEvent {
                chapter,
                event: event.clone(),
            },
        );
        Ok(())
    }

    async fn list_participated(
        &self,
        id: &CharacterId,
        chapter: ChapterNumber,
    ) -> Result<Vec<ParticipationRecord>, RepoError> {
        let state = self.state.read().await;
        if state.version(id, chapter).is_none() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for stored in state.events.values() {
            if stored.chapter != chapter || !stored.event.involves(id) {
                continue;
            }
            let event = &stored.event;
            let scene = event
                .scene_id
                .as_ref()
                .and_then(|scene_id| state.scenes.get(scene_id))
                .map(|stored| &stored.scene);
            let emotional_impact = if event.emotional_impact.is_empty() {
                None
            } else {
                Some(event.emotional_impact.to_storage()?)
            };

            records.push(ParticipationRecord {
                event_id: event.id.clone(),
                event_name: event.name.clone(),
                event_order: event.order,
                details: event.details.clone(),
                scene_id: scene.map(|s| s.id.clone()),
                scene_name: scene.and_then(|s| s.name.clone()),
                scene_place: scene.and_then(|s| s.place.clone()),
                emotional_impact,
                consequences: event.consequences.clone(),
            });
        }

        records.sort_by(|a, b| {
            a.event_order
                .cmp(&b.event_order)
                .then_with(|| a.event_id.cmp(&b.event_id))
        });
        Ok(records)
    }

    async fn list_between(
        &self,
        after: ChapterNumber,
        through: ChapterNumber,
    ) -> Result<Vec<UpcomingEvent>, RepoError> {
        let state = self.state.read().await;
        let mut events: Vec<UpcomingEvent> = state
            .events
            .values()
            .filter(|stored| stored.chapter > after && stored.chapter <= through)
            .map(|stored| UpcomingEvent {
                chapter: stored.chapter,
                event_id: stored.event.id.clone(),
                event_name: stored.event.name.clone(),
                details: stored.event.details.clone(),
                event_order: stored.event.order,
            })
            .collect();

        events.sort_by(|a, b| {
            (a.chapter, a.event_order, &a.event_id).cmp(&(b.chapter, b.event_order, &b.event_id))
        });
        Ok(events)
    }
}

#[async_trait]
impl MaintenanceRepo for InMemoryGraph {
    async fn clear_chapter(&self, chapter: ChapterNumber) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        for versions in state.characters.values_mut() {
            versions.remove(&chapter);
        }
        state.characters.retain(|_, versions| !versions.is_empty());
        state.relationships.remove(&chapter);
        state.scenes.retain(|_, stored| stored.chapter != chapter);
        state.events.retain(|_, stored| stored.chapter != chapter);

        tracing::info!(chapter = %chapter, "Cleared chapter from in-memory graph");
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), RepoError> {
        *self.state.write().await = GraphState::default();
        tracing::info!("Cleared in-memory graph");
        Ok(())
    }
}

/// Map keys are the constraints; nothing to install.
#[async_trait]
impl SchemaRepo for InMemoryGraph {
    async fn ensure_constraints(&self) -> Result<(), RepoError> {
        Ok(())
    }
}
