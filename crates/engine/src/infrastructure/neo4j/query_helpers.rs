//! Generic query helpers to reduce Neo4j repository boilerplate.

use neo4rs::{Query, Row};

use crate::infrastructure::neo4j::Neo4jGraph;
use crate::infrastructure::ports::RepoError;

/// Execute a query and collect results using a converter function.
pub async fn collect_rows<T, F>(
    graph: &Neo4jGraph,
    query: Query,
    operation: &'static str,
    converter: F,
) -> Result<Vec<T>, RepoError>
where
    F: Fn(Row) -> Result<T, RepoError>,
{
    let mut result = graph
        .execute(query)
        .await
        .map_err(|e| RepoError::database(operation, e))?;

    let mut items = Vec::new();
    while let Some(row) = result
        .next()
        .await
        .map_err(|e| RepoError::database(operation, e))?
    {
        items.push(converter(row)?);
    }
    Ok(items)
}

/// Execute a query and return first result using a converter function.
pub async fn get_first_row<T, F>(
    graph: &Neo4jGraph,
    query: Query,
    operation: &'static str,
    converter: F,
) -> Result<Option<T>, RepoError>
where
    F: Fn(Row) -> Result<T, RepoError>,
{
    let mut result = graph
        .execute(query)
        .await
        .map_err(|e| RepoError::database(operation, e))?;

    match result
        .next()
        .await
        .map_err(|e| RepoError::database(operation, e))?
    {
        Some(row) => Ok(Some(converter(row)?)),
        None => Ok(None),
    }
}

/// Execute a write query with no return value.
pub async fn run_query(
    graph: &Neo4jGraph,
    query: Query,
    operation: &'static str,
) -> Result<(), RepoError> {
    graph
        .run(query)
        .await
        .map_err(|e| RepoError::database(operation, e))
}

/// Run all queries in one transaction. Any failure rolls the whole batch back.
pub async fn run_in_transaction(
    graph: &Neo4jGraph,
    queries: Vec<Query>,
    operation: &'static str,
) -> Result<(), RepoError> {
    let mut txn = graph
        .start_txn()
        .await
        .map_err(|e| RepoError::database(operation, e))?;

    if let Err(e) = txn.run_queries(queries).await {
        if let Err(rollback_err) = txn.rollback().await {
            tracing::warn!(operation, error = %rollback_err, "Transaction rollback failed");
        }
        return Err(RepoError::database(operation, e));
    }

    txn.commit()
        .await
        .map_err(|e| RepoError::database(operation, e))
}
