//! Chapter cleanup against Neo4j.

use async_trait::async_trait;
use neo4rs::query;
use storygraph_domain::ChapterNumber;

use super::query_helpers::{run_in_transaction, run_query};
use super::Neo4jGraph;
use crate::infrastructure::ports::{MaintenanceRepo, RepoError};

pub struct Neo4jMaintenanceRepo {
    graph: Neo4jGraph,
}

impl Neo4jMaintenanceRepo {
    pub fn new(graph: Neo4jGraph) -> Self {
        Self { graph }
    }
}

#[async_trait]
impl MaintenanceRepo for Neo4jMaintenanceRepo {
    async fn clear_chapter(&self, chapter: ChapterNumber) -> Result<(), RepoError> {
        let value = chapter.as_i64();
        let queries = vec![
            query("MATCH (c:Character {chapter: $chapter}) DETACH DELETE c").param("chapter", value),
            query("MATCH (s:Scene {chapter: $chapter}) DETACH DELETE s").param("chapter", value),
            query("MATCH (e:Event {chapter: $chapter}) DETACH DELETE e").param("chapter", value),
            query("MATCH ()-[r]->() WHERE r.chapter = $chapter DELETE r").param("chapter", value),
        ];

        run_in_transaction(&self.graph, queries, "clear_chapter").await?;
        tracing::info!(chapter = %chapter, "Cleared chapter data");
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), RepoError> {
        run_query(
            &self.graph,
            query(
                "MATCH (n)
                WHERE n:Character OR n:Scene OR n:Event
                DETACH DELETE n",
            ),
            "clear_all",
        )
        .await?;
        tracing::info!("Cleared all chapter data");
        Ok(())
    }
}
