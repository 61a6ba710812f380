//! Neo4j connection management

use anyhow::{Context, Result};
use neo4rs::{query, ConfigBuilder, Graph};

use super::Neo4jGraph;
use crate::infrastructure::settings::Neo4jSettings;

/// Open a pooled connection and verify it with a trivial query.
pub async fn connect(settings: &Neo4jSettings) -> Result<Neo4jGraph> {
    let mut builder = ConfigBuilder::default()
        .uri(settings.uri.as_str())
        .user(settings.user.as_str())
        .password(settings.password.as_str())
        .max_connections(settings.max_connections)
        .fetch_size(settings.fetch_size);
    if let Some(database) = &settings.database {
        builder = builder.db(database.as_str());
    }
    let config = builder.build().context("Invalid Neo4j configuration")?;

    let graph = tokio::time::timeout(settings.connect_timeout, async {
        let graph = Graph::connect(config).await?;
        graph.run(query("RETURN 1")).await?;
        Ok::<_, neo4rs::Error>(graph)
    })
    .await
    .with_context(|| {
        format!(
            "Timed out connecting to Neo4j at {} after {:?}",
            settings.uri, settings.connect_timeout
        )
    })?
    .with_context(|| format!("Failed to connect to Neo4j at {}", settings.uri))?;

    tracing::info!(
        uri = %settings.uri,
        max_connections = settings.max_connections,
        "Connected to Neo4j"
    );
    Ok(Neo4jGraph::new(graph))
}
