//! APOC-backed duplicate node merging.

use async_trait::async_trait;
use neo4rs::query;

use super::helpers::PropertyExt;
use super::query_helpers::get_first_row;
use super::Neo4jGraph;
use crate::infrastructure::ports::{DedupCapability, NodeKind, RepoError};

/// Merges nodes sharing an identity with `apoc.refactor.mergeNodes`.
///
/// Properties of the first node win; relationships of all duplicates are
/// moved onto the survivor.
pub struct ApocDedup {
    graph: Neo4jGraph,
}

impl ApocDedup {
    pub fn new(graph: Neo4jGraph) -> Self {
        Self { graph }
    }
}

#[async_trait]
impl DedupCapability for ApocDedup {
    async fn is_available(&self) -> bool {
        let probe = get_first_row(
            &self.graph,
            query("RETURN apoc.version() AS version"),
            "apoc_version",
            |row| Ok(row.get_optional_string("version")),
        )
        .await;

        match probe {
            Ok(Some(Some(version))) => {
                tracing::debug!(version = %version, "APOC available");
                true
            }
            Ok(_) => false,
            Err(e) => {
                tracing::debug!(error = %e, "APOC probe failed");
                false
            }
        }
    }

    async fn merge_duplicates(&self, kind: NodeKind) -> Result<u64, RepoError> {
        // Label and property come from a closed enum, never from input.
        let cypher = format!(
            "MATCH (n:{label})
            WHERE n.{prop} IS NOT NULL
            WITH n.{prop} AS identity, collect(n) AS nodes
            WHERE size(nodes) > 1
            CALL apoc.refactor.mergeNodes(nodes, {{properties: 'discard', mergeRels: true}})
            YIELD node
            RETURN count(node) AS merged",
            label = kind.label(),
            prop = kind.identity_property(),
        );

        let merged = get_first_row(&self.graph, query(&cypher), "merge_duplicates", |row| {
            Ok(row.get_i64_or("merged", 0))
        })
        .await?
        .unwrap_or(0);

        Ok(u64::try_from(merged).unwrap_or(0))
    }
}
