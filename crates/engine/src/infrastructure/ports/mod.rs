//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Database access (Neo4j or the in-memory store)
//! - Optional store capabilities (duplicate merging)
//! - Profile output (filesystem or anything else that accepts memory documents)

mod error;
mod repos;
mod sink;
mod types;

pub use error::RepoError;
pub use repos::*;
pub use sink::{ProfileSink, SinkError};
pub use types::{ChapterWrite, NodeKind, ParticipationRecord, StoredEvent, StoredScene};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use sink::MockProfileSink;
