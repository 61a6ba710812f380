//! Schema setup run at startup.

use std::sync::Arc;

use tracing::{info, warn};

use crate::infrastructure::ports::{DedupCapability, NodeKind, RepoError, SchemaRepo};

pub struct EnsureSchema {
    schema: Arc<dyn SchemaRepo>,
    dedup: Arc<dyn DedupCapability>,
}

impl EnsureSchema {
    pub fn new(schema: Arc<dyn SchemaRepo>, dedup: Arc<dyn DedupCapability>) -> Self {
        Self { schema, dedup }
    }

    /// Merge existing duplicates when the backend can, then create the
    /// uniqueness constraints and indexes.
    ///
    /// Duplicate merging is best effort; a constraint failure is fatal.
    pub async fn execute(&self) -> Result<(), RepoError> {
        if self.dedup.is_available().await {
            for kind in NodeKind::ALL {
                match self.dedup.merge_duplicates(kind).await {
                    Ok(0) => {}
                    Ok(merged) => info!(kind = %kind, merged, "Merged duplicate nodes"),
                    Err(e) => warn!(kind = %kind, error = %e, "Duplicate merge failed"),
                }
            }
        } else {
            warn!("Duplicate merging unavailable; constraints may fail on existing duplicates");
        }

        self.schema.ensure_constraints().await?;
        info!("Schema constraints ensured");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockDedupCapability, MockSchemaRepo};

    #[tokio::test]
    async fn merges_every_kind_before_constraints() {
        let mut dedup = MockDedupCapability::new();
        dedup.expect_is_available().returning(|| true);
        dedup
            .expect_merge_duplicates()
            .times(3)
            .returning(|kind| match kind {
                NodeKind::Scene => Err(RepoError::database("merge", "procedure failed")),
                _ => Ok(1),
            });
        let mut schema = MockSchemaRepo::new();
        schema.expect_ensure_constraints().times(1).returning(|| Ok(()));

        EnsureSchema::new(Arc::new(schema), Arc::new(dedup))
            .execute()
            .await
            .expect("schema");
    }

    #[tokio::test]
    async fn skips_merge_when_unavailable() {
        let mut dedup = MockDedupCapability::new();
        dedup.expect_is_available().returning(|| false);
        dedup.expect_merge_duplicates().never();
        let mut schema = MockSchemaRepo::new();
        schema.expect_ensure_constraints().times(1).returning(|| Ok(()));

        EnsureSchema::new(Arc::new(schema), Arc::new(dedup))
            .execute()
            .await
            .expect("schema");
    }

    #[tokio::test]
    async fn constraint_failure_is_fatal() {
        let mut dedup = MockDedupCapability::new();
        dedup.expect_is_available().returning(|| false);
        let mut schema = MockSchemaRepo::new();
        schema
            .expect_ensure_constraints()
            .returning(|| Err(RepoError::constraint("duplicate Scene ids")));

        let result = EnsureSchema::new(Arc::new(schema), Arc::new(dedup))
            .execute()
            .await;
        assert!(matches!(result, Err(RepoError::ConstraintViolation(_))));
    }
}
