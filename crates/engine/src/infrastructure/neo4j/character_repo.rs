//! Neo4j repository for chapter-versioned characters and relationships.
//!
//! # Graph Layout
//!
//! - Character versions: `(:Character {id, chapter, version_key, name, attributes})`
//!   where `version_key = "<id>@<chapter>"` is unique and `attributes` holds
//!   the full attribute set as JSON.
//! - Relationships: `(a:Character)-[:RELATES_TO {from_id, to_id, type, intensity,
//!   awareness, detail, reason, chapter}]->(b:Character)` between two versions
//!   of the same chapter.

use async_trait::async_trait;
use neo4rs::{query, Query, Row};
use storygraph_domain::{
    ChapterNumber, Character, CharacterId, Intensity, ProfileRelationship, Relationship,
    RelationshipCheckEntry,
};

use super::helpers::{node_column, PropertyExt};
use super::query_helpers::{collect_rows, get_first_row, run_in_transaction};
use super::Neo4jGraph;
use crate::infrastructure::ports::{ChapterWrite, CharacterRepo, RepoError};

/// Composite identity of a character version.
pub(super) fn version_key(id: &CharacterId, chapter: ChapterNumber) -> String {
    format!("{}@{}", id, chapter)
}

/// Query that creates or updates one character version.
pub(super) fn upsert_version_query(
    character: &Character,
    chapter: ChapterNumber,
) -> Result<Query, RepoError> {
    let attributes =
        serde_json::to_string(character).map_err(|e| RepoError::serialization(e.to_string()))?;

    Ok(query(
        "MERGE (c:Character {version_key: $version_key})
        SET c.id = $id,
            c.chapter = $chapter,
            c.name = $name,
            c.attributes = $attributes",
    )
    .param("version_key", version_key(&character.id, chapter))
    .param("id", character.id.to_string())
    .param("chapter", chapter.as_i64())
    .param("name", character.name.clone().unwrap_or_default())
    .param("attributes", attributes))
}

fn row_to_character(row: Row) -> Result<Character, RepoError> {
    let node = node_column(&row, "c")?;
    node.get_json::<Character>("attributes")
        .map_err(|e| RepoError::serialization(format!("{:#}", e)))
}

fn row_to_relationship(row: Row) -> Result<Relationship, RepoError> {
    let from_id = CharacterId::new(row.get_string_strict("from_id")?)?;
    let to_id = CharacterId::new(row.get_string_strict("to_id")?)?;

    Ok(Relationship::new(from_id, to_id, row.get_string_strict("type")?)
        .with_intensity(Intensity::new(row.get_i64_strict("intensity")?)?)
        .with_awareness(row.get_string_or("awareness", "Unknown"))
        .with_detail(row.get_string_or("detail", ""))
        .with_reason(row.get_string_or("reason", ""))
        .at_chapter(row.get_chapter("chapter")?))
}

fn row_to_outgoing(row: Row) -> Result<ProfileRelationship, RepoError> {
    Ok(ProfileRelationship {
        character_id: CharacterId::new(row.get_string_strict("character_id")?)?,
        name: row.get_optional_string("name"),
        kind: row.get_string_strict("type")?,
        intensity: Intensity::new(row.get_i64_strict("intensity")?)?,
        awareness: row.get_string_or("awareness", "Unknown"),
        detail: row.get_string_or("detail", ""),
        reason: row.get_string_or("reason", ""),
        chapter: row.get_chapter("chapter")?,
    })
}

fn row_to_edge_count(row: Row) -> Result<RelationshipCheckEntry, RepoError> {
    let count = row.get_i64_strict("count")?;
    Ok(RelationshipCheckEntry {
        from_id: CharacterId::new(row.get_string_strict("from_id")?)?,
        to_id: CharacterId::new(row.get_string_strict("to_id")?)?,
        kinds: row.get_string_list("kinds"),
        count: usize::try_from(count)
            .map_err(|_| RepoError::database("query", format!("Invalid edge count: {}", count)))?,
    })
}

/// Repository for character versions and their relationships.
pub struct Neo4jCharacterRepo {
    graph: Neo4jGraph,
}

impl Neo4jCharacterRepo {
    pub fn new(graph: Neo4jGraph) -> Self {
        Self { graph }
    }
}

#[async_trait]
impl CharacterRepo for Neo4jCharacterRepo {
    async fn get_version(
        &self,
        id: &CharacterId,
        chapter: ChapterNumber,
    ) -> Result<Option<Character>, RepoError> {
        let q = query("MATCH (c:Character {version_key: $version_key}) RETURN c")
            .param("version_key", version_key(id, chapter));

        get_first_row(&self.graph, q, "get_character_version", row_to_character).await
    }

    async fn list_versions(&self, chapter: ChapterNumber) -> Result<Vec<Character>, RepoError> {
        let q = query(
            "MATCH (c:Character {chapter: $chapter})
            RETURN c
            ORDER BY c.id",
        )
        .param("chapter", chapter.as_i64());

        collect_rows(&self.graph, q, "list_character_versions", row_to_character).await
    }

    async fn list_relationships(
        &self,
        chapter: ChapterNumber,
    ) -> Result<Vec<Relationship>, RepoError> {
        let q = query(
            "MATCH (:Character {chapter: $chapter})-[r:RELATES_TO {chapter: $chapter}]->(:Character)
            RETURN r.from_id AS from_id,
                   r.to_id AS to_id,
                   r.type AS type,
                   r.intensity AS intensity,
                   r.awareness AS awareness,
                   r.detail AS detail,
                   r.reason AS reason,
                   r.chapter AS chapter
            ORDER BY from_id, to_id",
        )
        .param("chapter", chapter.as_i64());

        collect_rows(&self.graph, q, "list_relationships", row_to_relationship).await
    }

    async fn list_outgoing(
        &self,
        id: &CharacterId,
        chapter: ChapterNumber,
    ) -> Result<Vec<ProfileRelationship>, RepoError> {
        let q = query(
            "MATCH (c:Character {version_key: $version_key})-[r:RELATES_TO {chapter: $chapter}]->(other:Character)
            RETURN other.id AS character_id,
                   other.name AS name,
                   r.type AS type,
                   r.intensity AS intensity,
                   r.awareness AS awareness,
                   r.detail AS detail,
                   r.reason AS reason,
                   r.chapter AS chapter
            ORDER BY character_id",
        )
        .param("version_key", version_key(id, chapter))
        .param("chapter", chapter.as_i64());

        collect_rows(&self.graph, q, "list_outgoing_relationships", row_to_outgoing).await
    }

    async fn write_chapter(&self, write: &ChapterWrite) -> Result<(), RepoError> {
        let chapter = write.chapter;
        let mut queries = Vec::with_capacity(write.characters.len() + write.relationships.len() + 2);

        // Versions a previous run wrote that this one omits; event stubs stay.
        let ids: Vec<String> = write.characters.iter().map(|c| c.id.to_string()).collect();
        queries.push(
            query(
                "MATCH (c:Character {chapter: $chapter})
                WHERE NOT c.id IN $ids
                  AND NOT (c)-[:IN_EVENT {chapter: $chapter}]->()
                DETACH DELETE c",
            )
            .param("chapter", chapter.as_i64())
            .param("ids", ids),
        );

        for character in &write.characters {
            queries.push(upsert_version_query(character, chapter)?);
        }

        // Drop whatever a previous run left at this chapter before recreating.
        queries.push(
            query(
                "MATCH (:Character {chapter: $chapter})-[r:RELATES_TO {chapter: $chapter}]->()
                DELETE r",
            )
            .param("chapter", chapter.as_i64()),
        );

        for rel in &write.relationships {
            queries.push(
                query(
                    "MATCH (a:Character {version_key: $from_key}), (b:Character {version_key: $to_key})
                    CREATE (a)-[:RELATES_TO {
                        from_id: $from_id,
                        to_id: $to_id,
                        type: $type,
                        intensity: $intensity,
                        awareness: $awareness,
                        detail: $detail,
                        reason: $reason,
                        chapter: $chapter
                    }]->(b)",
                )
                .param("from_key", version_key(&rel.from_id, chapter))
                .param("to_key", version_key(&rel.to_id, chapter))
                .param("from_id", rel.from_id.to_string())
                .param("to_id", rel.to_id.to_string())
                .param("type", rel.kind.clone())
                .param("intensity", i64::from(rel.intensity))
                .param("awareness", rel.awareness.clone())
                .param("detail", rel.detail.clone())
                .param("reason", rel.reason.clone())
                .param("chapter", chapter.as_i64()),
            );
        }

        run_in_transaction(&self.graph, queries, "write_chapter").await?;

        tracing::debug!(
            chapter = %chapter,
            characters = write.characters.len(),
            relationships = write.relationships.len(),
            "Wrote chapter versions"
        );
        Ok(())
    }

    async fn relationship_edge_counts(
        &self,
        chapter: ChapterNumber,
    ) -> Result<Vec<RelationshipCheckEntry>, RepoError> {
        let q = query(
            "MATCH (a:Character {chapter: $chapter})-[r:RELATES_TO {chapter: $chapter}]->(b:Character)
            RETURN a.id AS from_id,
                   b.id AS to_id,
                   collect(r.type) AS kinds,
                   count(r) AS count
            ORDER BY from_id, to_id",
        )
        .param("chapter", chapter.as_i64());

        collect_rows(&self.graph, q, "relationship_edge_counts", row_to_edge_count).await
    }
}
