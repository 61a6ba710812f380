//! Use cases - chapter ingestion and chapter-scoped queries.
//!
//! Each module orchestrates the port traits from `infrastructure::ports`.

pub mod export;
pub mod ingest;
pub mod maintenance;
pub mod profile;
pub mod schema;

pub use export::{ExportError, ExportFailure, ExportProfiles, ExportSummary};
pub use ingest::{parse_document, CommitSummary, IngestChapter, IngestError, WriteLock};
pub use maintenance::Maintenance;
pub use profile::{EventLookupError, ProfileError, ProfileUseCases, DEFAULT_WINDOW_LIMIT};
pub use schema::EnsureSchema;
