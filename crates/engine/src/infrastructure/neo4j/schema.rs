//! Neo4j schema initialization - constraints and indexes.

use async_trait::async_trait;
use neo4rs::query;

use super::Neo4jGraph;
use crate::infrastructure::ports::{RepoError, SchemaRepo};

/// Uniqueness constraints. A failure here is fatal at startup.
const CONSTRAINTS: [&str; 3] = [
    // Character versions are keyed by "<id>@<chapter>".
    "CREATE CONSTRAINT character_version_unique IF NOT EXISTS
     FOR (c:Character) REQUIRE c.version_key IS UNIQUE",
    "CREATE CONSTRAINT scene_id_unique IF NOT EXISTS
     FOR (s:Scene) REQUIRE s.id IS UNIQUE",
    "CREATE CONSTRAINT event_id_unique IF NOT EXISTS
     FOR (e:Event) REQUIRE e.id IS UNIQUE",
];

const INDEXES: [&str; 4] = [
    "CREATE INDEX character_id IF NOT EXISTS FOR (c:Character) ON (c.id)",
    "CREATE INDEX character_chapter IF NOT EXISTS FOR (c:Character) ON (c.chapter)",
    "CREATE INDEX scene_chapter IF NOT EXISTS FOR (s:Scene) ON (s.chapter)",
    "CREATE INDEX event_chapter IF NOT EXISTS FOR (e:Event) ON (e.chapter)",
];

pub struct Neo4jSchema {
    graph: Neo4jGraph,
}

impl Neo4jSchema {
    pub fn new(graph: Neo4jGraph) -> Self {
        Self { graph }
    }
}

#[async_trait]
impl SchemaRepo for Neo4jSchema {
    /// Constraints are created with IF NOT EXISTS to be idempotent.
    async fn ensure_constraints(&self) -> Result<(), RepoError> {
        for constraint in CONSTRAINTS {
            self.graph
                .run(query(constraint))
                .await
                .map_err(|e| RepoError::constraint(format!("{}: {}", constraint, e)))?;
        }

        for index in INDEXES {
            if let Err(e) = self.graph.run(query(index)).await {
                tracing::warn!(error = %e, "Index creation warning");
            }
        }

        tracing::info!("Neo4j schema initialized (constraints and indexes ensured)");
        Ok(())
    }
}
