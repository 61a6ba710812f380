//! Output port for exported character memories.

use async_trait::async_trait;
use storygraph_domain::CharacterMemory;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Destination for per-character memory documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileSink: Send + Sync {
    /// Write one memory document, returning where it was written.
    async fn write(&self, memory: &CharacterMemory) -> Result<String, SinkError>;
}
