//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod export;
pub mod memory;
pub mod neo4j;
pub mod ports;
pub mod settings;
