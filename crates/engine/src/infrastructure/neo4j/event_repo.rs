//! Neo4j event repository implementation.
//!
//! # Graph Layout
//!
//! - Events: `(:Event {id, chapter, name, details, order, scene_id, participants,
//!   emotional_impact, consequences})`; `emotional_impact` is a JSON string.
//! - Participation: `(:Character version)-[:IN_EVENT {chapter}]->(:Event)`.
//! - Scene: `(:Event)-[:OCCURRED_IN]->(:Scene)`, untagged.

use async_trait::async_trait;
use neo4rs::{query, Row};
use storygraph_domain::{
    ChapterNumber, Character, CharacterId, EmotionalImpact, Event, EventId, SceneId,
    UpcomingEvent, UNSPECIFIED_TIME_PERIOD,
};

use super::character_repo::version_key;
use super::helpers::{node_column, PropertyExt};
use super::query_helpers::{collect_rows, get_first_row, run_in_transaction};
use super::Neo4jGraph;
use crate::infrastructure::ports::{EventRepo, ParticipationRecord, RepoError, StoredEvent};

fn optional_scene_id(raw: Option<String>) -> Result<Option<SceneId>, RepoError> {
    raw.map(SceneId::new).transpose().map_err(RepoError::from)
}

fn row_to_event(row: Row) -> Result<StoredEvent, RepoError> {
    let node = node_column(&row, "e")?;

    let participants = node
        .get_string_list("participants")
        .into_iter()
        .map(CharacterId::new)
        .collect::<Result<Vec<_>, _>>()?;
    let emotional_impact = match node.get_optional_string("emotional_impact") {
        Some(stored) => EmotionalImpact::from_storage(&stored)?,
        None => EmotionalImpact::default(),
    };

    let mut event = Event::new(EventId::new(node.get_string_strict("id")?)?)
        .with_order(node.get_i64_or("order", 0))
        .with_participants(participants)
        .with_emotional_impact(emotional_impact)
        .with_consequences(node.get_string_list("consequences"));
    event.name = node.get_optional_string("name");
    event.details = node.get_optional_string("details");
    event.scene_id = optional_scene_id(node.get_optional_string("scene_id"))?;

    Ok(StoredEvent {
        chapter: node.get_chapter("chapter")?,
        event,
    })
}

fn row_to_participation(row: Row) -> Result<ParticipationRecord, RepoError> {
    Ok(ParticipationRecord {
        event_id: EventId::new(row.get_string_strict("event_id")?)?,
        event_name: row.get_optional_string("event_name"),
        event_order: row.get_i64_or("event_order", 0),
        details: row.get_optional_string("details"),
        scene_id: optional_scene_id(row.get_optional_string("scene_id"))?,
        scene_name: row.get_optional_string("scene_name"),
        scene_place: row.get_optional_string("scene_place"),
        emotional_impact: row.get_optional_string("emotional_impact"),
        consequences: row.get_string_list("consequences"),
    })
}

fn row_to_upcoming(row: Row) -> Result<UpcomingEvent, RepoError> {
    Ok(UpcomingEvent {
        chapter: row.get_chapter("chapter")?,
        event_id: EventId::new(row.get_string_strict("event_id")?)?,
        event_name: row.get_optional_string("event_name"),
        details: row.get_optional_string("details"),
        event_order: row.get_i64_or("event_order", 0),
    })
}

/// Repository for Event operations.
pub struct Neo4jEventRepo {
    graph: Neo4jGraph,
}

impl Neo4jEventRepo {
    pub fn new(graph: Neo4jGraph) -> Self {
        Self { graph }
    }
}

#[async_trait]
impl EventRepo for Neo4jEventRepo {
    async fn get(&self, id: &EventId) -> Result<Option<StoredEvent>, RepoError> {
        let q = query("MATCH (e:Event {id: $id}) RETURN e").param("id", id.to_string());
        get_first_row(&self.graph, q, "get_event", row_to_event).await
    }

    async fn save(&self, chapter: ChapterNumber, event: &Event) -> Result<(), RepoError> {
        let event_id = event.id.to_string();
        let participants: Vec<String> = event.participants.iter().map(|p| p.to_string()).collect();
        let mut queries = Vec::with_capacity(event.participants.len() + 4);

        queries.push(
            query(
                "MERGE (e:Event {id: $id})
                SET e.chapter = $chapter,
                    e.name = $name,
                    e.details = $details,
                    e.order = $order,
                    e.scene_id = $scene_id,
                    e.participants = $participants,
                    e.emotional_impact = $emotional_impact,
                    e.consequences = $consequences",
            )
            .param("id", event_id.clone())
            .param("chapter", chapter.as_i64())
            .param("name", event.name.clone().unwrap_or_default())
            .param("details", event.details.clone().unwrap_or_default())
            .param("order", event.order)
            .param(
                "scene_id",
                event.scene_id.as_ref().map(|s| s.to_string()).unwrap_or_default(),
            )
            .param("participants", participants)
            .param("emotional_impact", event.emotional_impact.to_storage()?)
            .param("consequences", event.consequences.clone()),
        );

        // Links are rebuilt from the event on every save.
        queries.push(
            query(
                "MATCH (e:Event {id: $id})
                OPTIONAL MATCH ()-[p:IN_EVENT]->(e)
                DELETE p",
            )
            .param("id", event_id.clone()),
        );
        queries.push(
            query(
                "MATCH (e:Event {id: $id})
                OPTIONAL MATCH (e)-[o:OCCURRED_IN]->()
                DELETE o",
            )
            .param("id", event_id.clone()),
        );

        for participant in &event.participants {
            let stub = serde_json::to_string(&Character::new(participant.clone()))
                .map_err(|e| RepoError::serialization(e.to_string()))?;
            queries.push(
                query(
                    "MATCH (e:Event {id: $event_id})
                    MERGE (c:Character {version_key: $version_key})
                    ON CREATE SET c.id = $character_id,
                                  c.chapter = $chapter,
                                  c.name = '',
                                  c.attributes = $attributes
                    MERGE (c)-[:IN_EVENT {chapter: $chapter}]->(e)",
                )
                .param("event_id", event_id.clone())
                .param("version_key", version_key(participant, chapter))
                .param("character_id", participant.to_string())
                .param("chapter", chapter.as_i64())
                .param("attributes", stub),
            );
        }

        if let Some(scene_id) = &event.scene_id {
            queries.push(
                query(
                    "MATCH (e:Event {id: $event_id})
                    MERGE (s:Scene {id: $scene_id})
                    ON CREATE SET s.chapter = $chapter,
                                  s.time_period = $time_period
                    MERGE (e)-[:OCCURRED_IN]->(s)",
                )
                .param("event_id", event_id.clone())
                .param("scene_id", scene_id.to_string())
                .param("chapter", chapter.as_i64())
                .param("time_period", UNSPECIFIED_TIME_PERIOD),
            );
        }

        run_in_transaction(&self.graph, queries, "save_event").await?;

        tracing::debug!(
            event_id = %event.id,
            chapter = %chapter,
            participants = event.participants.len(),
            "Saved event"
        );
        Ok(())
    }

    async fn list_participated(
        &self,
        id: &CharacterId,
        chapter: ChapterNumber,
    ) -> Result<Vec<ParticipationRecord>, RepoError> {
        let q = query(
            "MATCH (c:Character {version_key: $version_key})-[:IN_EVENT {chapter: $chapter}]->(e:Event {chapter: $chapter})
            OPTIONAL MATCH (e)-[:OCCURRED_IN]->(s:Scene)
            RETURN e.id AS event_id,
                   e.name AS event_name,
                   e.order AS event_order,
                   e.details AS details,
                   s.id AS scene_id,
                   s.name AS scene_name,
                   s.place AS scene_place,
                   e.emotional_impact AS emotional_impact,
                   e.consequences AS consequences
            ORDER BY event_order, event_id",
        )
        .param("version_key", version_key(id, chapter))
        .param("chapter", chapter.as_i64());

        collect_rows(&self.graph, q, "list_participated_events", row_to_participation).await
    }

    async fn list_between(
        &self,
        after: ChapterNumber,
        through: ChapterNumber,
    ) -> Result<Vec<UpcomingEvent>, RepoError> {
        let q = query(
            "MATCH (e:Event)
            WHERE e.chapter > $after AND e.chapter <= $through
            RETURN e.id AS event_id,
                   e.name AS event_name,
                   e.details AS details,
                   e.order AS event_order,
                   e.chapter AS chapter
            ORDER BY chapter, event_order, event_id",
        )
        .param("after", after.as_i64())
        .param("through", through.as_i64());

        collect_rows(&self.graph, q, "list_events_between", row_to_upcoming).await
    }
}
