//! Common utility functions shared by the domain types and the engine adapters.
//!
//! - **Pure functions only** - no side effects, no I/O

pub mod lenient;
pub mod string;

pub use string::{none_if_empty, some_if_not_empty, StringExt};
