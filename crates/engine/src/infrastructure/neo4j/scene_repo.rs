//! Neo4j scene repository implementation.
//!
//! Scenes are plain `(:Scene {id, chapter, ...})` nodes. Unset attributes are
//! stored as empty strings and read back as absent.

use async_trait::async_trait;
use neo4rs::{query, Row};
use storygraph_domain::{ChapterNumber, Scene, SceneId};

use super::helpers::{node_column, PropertyExt};
use super::query_helpers::{get_first_row, run_query};
use super::Neo4jGraph;
use crate::infrastructure::ports::{RepoError, SceneRepo, StoredScene};

fn row_to_scene(row: Row) -> Result<StoredScene, RepoError> {
    let node = node_column(&row, "s")?;

    let mut scene = Scene::new(SceneId::new(node.get_string_strict("id")?)?);
    scene.name = node.get_optional_string("name");
    scene.place = node.get_optional_string("place");
    scene.time_period = node.get_optional_string("time_period");
    scene.atmosphere = node.get_optional_string("atmosphere");
    scene.pov_character = node.get_optional_string("pov_character");
    scene.owner = node.get_optional_string("owner");

    Ok(StoredScene {
        chapter: node.get_chapter("chapter")?,
        scene,
    })
}

/// Repository for Scene operations.
pub struct Neo4jSceneRepo {
    graph: Neo4jGraph,
}

impl Neo4jSceneRepo {
    pub fn new(graph: Neo4jGraph) -> Self {
        Self { graph }
    }
}

#[async_trait]
impl SceneRepo for Neo4jSceneRepo {
    async fn get(&self, id: &SceneId) -> Result<Option<StoredScene>, RepoError> {
        let q = query("MATCH (s:Scene {id: $id}) RETURN s").param("id", id.to_string());
        get_first_row(&self.graph, q, "get_scene", row_to_scene).await
    }

    async fn save(&self, chapter: ChapterNumber, scene: &Scene) -> Result<(), RepoError> {
        // MERGE for upsert behavior
        let q = query(
            "MERGE (s:Scene {id: $id})
            SET s.chapter = $chapter,
                s.name = $name,
                s.place = $place,
                s.time_period = $time_period,
                s.atmosphere = $atmosphere,
                s.pov_character = $pov_character,
                s.owner = $owner",
        )
        .param("id", scene.id.to_string())
        .param("chapter", chapter.as_i64())
        .param("name", scene.name.clone().unwrap_or_default())
        .param("place", scene.place.clone().unwrap_or_default())
        .param("time_period", scene.time_period.clone().unwrap_or_default())
        .param("atmosphere", scene.atmosphere.clone().unwrap_or_default())
        .param("pov_character", scene.pov_character.clone().unwrap_or_default())
        .param("owner", scene.owner.clone().unwrap_or_default());

        run_query(&self.graph, q, "save_scene").await?;

        tracing::debug!(scene_id = %scene.id, chapter = %chapter, "Saved scene");
        Ok(())
    }
}
