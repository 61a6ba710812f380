//! Neo4j database implementations.

use std::sync::Arc;

mod character_repo;
mod connection;
mod dedup;
mod event_repo;
mod graph;
mod helpers;
mod maintenance_repo;
mod query_helpers;
mod scene_repo;
mod schema;

#[cfg(test)]
mod integration_tests;

pub use character_repo::Neo4jCharacterRepo;
pub use connection::connect;
pub use dedup::ApocDedup;
pub use event_repo::Neo4jEventRepo;
pub use graph::{Neo4jGraph, Neo4jRowStream};
pub use maintenance_repo::Neo4jMaintenanceRepo;
pub use scene_repo::Neo4jSceneRepo;
pub use schema::Neo4jSchema;

/// Create all Neo4j repositories from a graph connection.
pub struct Neo4jRepositories {
    pub character: Arc<Neo4jCharacterRepo>,
    pub scene: Arc<Neo4jSceneRepo>,
    pub event: Arc<Neo4jEventRepo>,
    pub maintenance: Arc<Neo4jMaintenanceRepo>,
    pub schema: Arc<Neo4jSchema>,
    pub dedup: Arc<ApocDedup>,
}

impl Neo4jRepositories {
    pub fn new(graph: Neo4jGraph) -> Self {
        Self {
            character: Arc::new(Neo4jCharacterRepo::new(graph.clone())),
            scene: Arc::new(Neo4jSceneRepo::new(graph.clone())),
            event: Arc::new(Neo4jEventRepo::new(graph.clone())),
            maintenance: Arc::new(Neo4jMaintenanceRepo::new(graph.clone())),
            schema: Arc::new(Neo4jSchema::new(graph.clone())),
            dedup: Arc::new(ApocDedup::new(graph)),
        }
    }
}
