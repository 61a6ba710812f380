//! Application state and composition.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::infrastructure::{
    memory::InMemoryGraph,
    neo4j::Neo4jRepositories,
    ports::{
        CharacterRepo, DedupCapability, EventRepo, MaintenanceRepo, NoDedup, ProfileSink,
        SceneRepo, SchemaRepo,
    },
};
use crate::use_cases;

/// Main application state.
///
/// Holds all repositories and use cases. Passed to HTTP handlers via Axum
/// state.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
}

/// Container for the port implementations of one backend.
#[derive(Clone)]
pub struct Repositories {
    pub character: Arc<dyn CharacterRepo>,
    pub scene: Arc<dyn SceneRepo>,
    pub event: Arc<dyn EventRepo>,
    pub maintenance: Arc<dyn MaintenanceRepo>,
    pub schema: Arc<dyn SchemaRepo>,
    pub dedup: Arc<dyn DedupCapability>,
}

impl Repositories {
    pub fn from_neo4j(repos: Neo4jRepositories) -> Self {
        Self {
            character: repos.character,
            scene: repos.scene,
            event: repos.event,
            maintenance: repos.maintenance,
            schema: repos.schema,
            dedup: repos.dedup,
        }
    }

    /// Every port backed by one shared in-process graph.
    pub fn in_memory(graph: Arc<InMemoryGraph>) -> Self {
        Self {
            character: graph.clone(),
            scene: graph.clone(),
            event: graph.clone(),
            maintenance: graph.clone(),
            schema: graph,
            dedup: Arc::new(NoDedup),
        }
    }
}

/// Container for all use cases.
pub struct UseCases {
    pub schema: Arc<use_cases::EnsureSchema>,
    pub ingest: Arc<use_cases::IngestChapter>,
    pub profile: use_cases::ProfileUseCases,
    pub maintenance: Arc<use_cases::Maintenance>,
    pub export: Arc<use_cases::ExportProfiles>,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(repositories: Repositories, profile_sink: Arc<dyn ProfileSink>) -> Self {
        // Shared by everything that rewrites a chapter.
        let write_lock: use_cases::WriteLock = Arc::new(Mutex::new(()));

        let profile = use_cases::ProfileUseCases::new(
            repositories.character.clone(),
            repositories.event.clone(),
        );

        let use_cases = UseCases {
            schema: Arc::new(use_cases::EnsureSchema::new(
                repositories.schema.clone(),
                repositories.dedup.clone(),
            )),
            ingest: Arc::new(use_cases::IngestChapter::new(
                repositories.character.clone(),
                repositories.scene.clone(),
                repositories.event.clone(),
                write_lock.clone(),
            )),
            maintenance: Arc::new(use_cases::Maintenance::new(
                repositories.character.clone(),
                repositories.maintenance.clone(),
                write_lock,
            )),
            export: Arc::new(use_cases::ExportProfiles::new(
                repositories.character.clone(),
                profile.profiles.clone(),
                profile_sink,
            )),
            profile,
        };

        Self {
            repositories,
            use_cases,
        }
    }

    pub fn with_neo4j(repos: Neo4jRepositories, profile_sink: Arc<dyn ProfileSink>) -> Self {
        Self::new(Repositories::from_neo4j(repos), profile_sink)
    }

    pub fn in_memory(profile_sink: Arc<dyn ProfileSink>) -> Self {
        Self::new(
            Repositories::in_memory(Arc::new(InMemoryGraph::new())),
            profile_sink,
        )
    }
}
