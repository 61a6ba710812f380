//! Chapter scenarios against a real Neo4j started with testcontainers.

use std::sync::Arc;
use std::time::Duration;

use neo4rs::{query, Graph};
use storygraph_domain::{
    ChapterDocument, ChapterNumber, Character, CharacterId, EmotionalImpact, Event, EventId,
    Intensity, Relationship, Scene, SceneId, NO_IMPACT_RECORD,
};
use testcontainers::{core::WaitFor, runners::AsyncRunner, ContainerAsync, GenericImage};
use tokio::time::sleep;

use super::{Neo4jGraph, Neo4jRepositories};
use crate::app::App;
use crate::infrastructure::export::FileProfileSink;

const TEST_NEO4J_PASSWORD: &str = "testpassword";

type HarnessResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

struct Neo4jTestHarness {
    _container: ContainerAsync<GenericImage>,
    graph: Graph,
}

impl Neo4jTestHarness {
    async fn start() -> HarnessResult<Self> {
        let container: ContainerAsync<GenericImage> =
            neo4j_image(TEST_NEO4J_PASSWORD).start().await;
        let bolt_port = container.get_host_port_ipv4(7687).await;
        let uri = format!("bolt://127.0.0.1:{bolt_port}");

        let graph = connect_with_retry(&uri, "neo4j", TEST_NEO4J_PASSWORD).await?;
        graph.run(query("MATCH (n) DETACH DELETE n")).await?;

        Ok(Self {
            _container: container,
            graph,
        })
    }

    fn app(&self, export_dir: &std::path::Path) -> App {
        App::with_neo4j(
            Neo4jRepositories::new(Neo4jGraph::new(self.graph.clone())),
            Arc::new(FileProfileSink::new(export_dir)),
        )
    }

    async fn count(&self, cypher: &str) -> HarnessResult<i64> {
        let mut result = self.graph.execute(query(cypher)).await?;
        let row = result.next().await?.ok_or("no rows")?;
        Ok(row.get::<i64>("count")?)
    }
}

fn neo4j_image(password: &str) -> GenericImage {
    GenericImage::new("neo4j", "5.26.0-community")
        .with_env_var("NEO4J_AUTH", format!("neo4j/{password}"))
        .with_env_var("NEO4J_server_memory_heap_initial__size", "256m")
        .with_env_var("NEO4J_server_memory_heap_max__size", "512m")
        .with_env_var("NEO4J_server_memory_pagecache_size", "128m")
        .with_exposed_port(7687)
        .with_exposed_port(7474)
        .with_wait_for(WaitFor::seconds(5))
}

/// Retry with exponential backoff (500ms doubling, capped at 5s).
async fn connect_with_retry(uri: &str, user: &str, pass: &str) -> HarnessResult<Graph> {
    let max_attempts = 30;
    let max_delay = Duration::from_secs(5);
    let mut delay = Duration::from_millis(500);
    let mut last_err = None;

    for attempt in 1..=max_attempts {
        match Graph::new(uri, user, pass).await {
            Ok(graph) => match graph.run(query("RETURN 1")).await {
                Ok(_) => return Ok(graph),
                Err(e) => last_err = Some(format!("Connection test query failed: {e}")),
            },
            Err(e) => last_err = Some(e.to_string()),
        }
        tracing::debug!(attempt, delay_ms = delay.as_millis(), "Retrying Neo4j connection");
        sleep(delay).await;
        delay = std::cmp::min(delay.saturating_mul(2), max_delay);
    }

    Err(format!("Failed to connect to Neo4j at {uri}: {last_err:?}").into())
}

fn cid(s: &str) -> CharacterId {
    CharacterId::new(s).expect("valid id")
}

fn bootstrap_document() -> ChapterDocument {
    ChapterDocument::new(ChapterNumber::BOOTSTRAP)
        .with_characters(vec![
            Character::new(cid("p1")).with_name("Lin"),
            Character::new(cid("p2")).with_name("Mo"),
        ])
        .with_relationships(vec![Relationship::new(cid("p1"), cid("p2"), "DEBT")
            .with_intensity(Intensity::new(5).expect("intensity"))])
}

fn chapter_one_document() -> ChapterDocument {
    let scene = SceneId::new("s1").expect("valid id");
    ChapterDocument::new(ChapterNumber::new(1))
        .with_characters(vec![Character::new(cid("p1")).with_health("Wounded")])
        .with_relationships(vec![Relationship::new(cid("p1"), cid("p2"), "ALLY")
            .with_intensity(Intensity::new(7).expect("intensity"))])
        .with_scenes(vec![Scene::new(scene.clone()).with_name("Harbor")])
        .with_events(vec![Event::new(EventId::new("e1").expect("valid id"))
            .with_name("Repayment")
            .with_details("Mo forgives the debt")
            .with_order(1)
            .in_scene(scene)
            .with_participants(vec![cid("p1"), cid("p2")])
            .with_emotional_impact(EmotionalImpact::new().with_entry(cid("p1"), "relieved"))])
}

#[tokio::test]
#[ignore = "requires docker (testcontainers)"]
async fn debt_becomes_alliance_in_chapter_one() {
    let harness = Neo4jTestHarness::start().await.expect("start neo4j");
    let export_dir = tempfile::tempdir().expect("tempdir");
    let app = harness.app(export_dir.path());
    app.use_cases.schema.execute().await.expect("schema");

    app.use_cases
        .ingest
        .load_bootstrap(bootstrap_document())
        .await
        .expect("bootstrap");
    let summary = app
        .use_cases
        .ingest
        .commit_chapter(chapter_one_document())
        .await
        .expect("chapter 1");
    assert_eq!(summary.relationships_overridden, 1);

    let before = app
        .use_cases
        .profile
        .profiles
        .get_profile(&cid("p1"), ChapterNumber::BOOTSTRAP)
        .await
        .expect("chapter 0 profile");
    assert_eq!(before.relationships[0].kind, "DEBT");

    let after = app
        .use_cases
        .profile
        .profiles
        .get_profile(&cid("p1"), ChapterNumber::new(1))
        .await
        .expect("chapter 1 profile");
    assert_eq!(after.relationships.len(), 1);
    assert_eq!(after.relationships[0].kind, "ALLY");
    assert_eq!(after.relationships[0].intensity.value(), 7);
    assert_eq!(after.properties.name.as_deref(), Some("Lin"));
    assert_eq!(after.properties.health.as_deref(), Some("Wounded"));
    assert_eq!(after.events.len(), 1);
    assert_eq!(after.events[0].emotional_impact, "relieved");
    assert_eq!(after.events[0].scene_name.as_deref(), Some("Harbor"));

    let p2 = app
        .use_cases
        .profile
        .profiles
        .get_profile(&cid("p2"), ChapterNumber::new(1))
        .await
        .expect("p2 profile");
    assert_eq!(p2.events[0].emotional_impact, NO_IMPACT_RECORD);
}

#[tokio::test]
#[ignore = "requires docker (testcontainers)"]
async fn recommitting_a_chapter_leaves_no_duplicates() {
    let harness = Neo4jTestHarness::start().await.expect("start neo4j");
    let export_dir = tempfile::tempdir().expect("tempdir");
    let app = harness.app(export_dir.path());
    app.use_cases.schema.execute().await.expect("schema");

    app.use_cases
        .ingest
        .load_bootstrap(bootstrap_document())
        .await
        .expect("bootstrap");
    for _ in 0..2 {
        app.use_cases
            .ingest
            .commit_chapter(chapter_one_document())
            .await
            .expect("chapter 1");
    }

    let edges = harness
        .count("MATCH ()-[r:RELATES_TO {chapter: 1}]->() RETURN count(r) AS count")
        .await
        .expect("count edges");
    assert_eq!(edges, 1);

    let versions = harness
        .count("MATCH (c:Character {chapter: 1}) RETURN count(c) AS count")
        .await
        .expect("count versions");
    assert_eq!(versions, 2);

    let report = app
        .use_cases
        .maintenance
        .check_chapter_relationships(ChapterNumber::new(1))
        .await
        .expect("check");
    assert_eq!(report.duplicate_count, 0);
}

#[tokio::test]
#[ignore = "requires docker (testcontainers)"]
async fn reloading_initial_data_drops_omitted_characters() {
    let harness = Neo4jTestHarness::start().await.expect("start neo4j");
    let export_dir = tempfile::tempdir().expect("tempdir");
    let app = harness.app(export_dir.path());

    let with_extra = ChapterDocument::new(ChapterNumber::BOOTSTRAP)
        .with_characters(vec![
            Character::new(cid("p1")),
            Character::new(cid("p2")),
            Character::new(cid("p3")),
        ])
        .with_events(vec![Event::new(EventId::new("e0").expect("valid id"))
            .with_participants(vec![cid("p2"), cid("ghost")])]);
    app.use_cases
        .ingest
        .load_bootstrap(with_extra)
        .await
        .expect("first load");
    app.use_cases
        .ingest
        .load_bootstrap(
            ChapterDocument::new(ChapterNumber::BOOTSTRAP)
                .with_characters(vec![Character::new(cid("p1"))]),
        )
        .await
        .expect("reload");

    let remaining = app
        .use_cases
        .maintenance
        .list_chapter_characters(ChapterNumber::BOOTSTRAP)
        .await
        .expect("list");
    assert_eq!(remaining, vec![cid("ghost"), cid("p1"), cid("p2")]);
}

#[tokio::test]
#[ignore = "requires docker (testcontainers)"]
async fn clearing_a_chapter_keeps_the_previous_one() {
    let harness = Neo4jTestHarness::start().await.expect("start neo4j");
    let export_dir = tempfile::tempdir().expect("tempdir");
    let app = harness.app(export_dir.path());

    app.use_cases
        .ingest
        .load_bootstrap(bootstrap_document())
        .await
        .expect("bootstrap");
    app.use_cases
        .ingest
        .commit_chapter(chapter_one_document())
        .await
        .expect("chapter 1");

    app.use_cases
        .maintenance
        .clear_chapter(ChapterNumber::new(1))
        .await
        .expect("clear");

    let remaining = app
        .use_cases
        .maintenance
        .list_chapter_characters(ChapterNumber::BOOTSTRAP)
        .await
        .expect("list");
    assert_eq!(remaining, vec![cid("p1"), cid("p2")]);

    let cleared = app
        .use_cases
        .maintenance
        .list_chapter_characters(ChapterNumber::new(1))
        .await
        .expect("list");
    assert!(cleared.is_empty());
}

#[tokio::test]
#[ignore = "requires docker (testcontainers)"]
async fn exported_memories_land_per_character() {
    let harness = Neo4jTestHarness::start().await.expect("start neo4j");
    let export_dir = tempfile::tempdir().expect("tempdir");
    let app = harness.app(export_dir.path());

    app.use_cases
        .ingest
        .load_bootstrap(bootstrap_document())
        .await
        .expect("bootstrap");

    let summary = app
        .use_cases
        .export
        .save_profiles_for_chapter(ChapterNumber::BOOTSTRAP)
        .await
        .expect("export");

    assert_eq!(summary.written.len(), 2);
    assert!(export_dir
        .path()
        .join("chapter_0_memories")
        .join("p1_memory.json")
        .exists());
}
