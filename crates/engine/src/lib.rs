//! Storygraph Engine library.
//!
//! Chapter-versioned storage and queries for a narrative world.
//!
//! ## Structure
//!
//! - `use_cases/` - Ingestion, versioning, and chapter-scoped queries
//! - `infrastructure/` - Port traits and their Neo4j and in-memory backends
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;


pub use app::App;
