//! Ingestion errors.

use storygraph_domain::DomainError;

use crate::infrastructure::ports::RepoError;

/// Errors that can occur while ingesting a chapter document.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("{kind}[{index}] is missing required field '{field}'")]
    MissingId {
        kind: &'static str,
        index: usize,
        field: &'static str,
    },
    #[error("Invalid chapter: {0}")]
    InvalidChapter(String),
    #[error("Malformed document: {0}")]
    Malformed(String),
    #[error("Validation error: {0}")]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}
