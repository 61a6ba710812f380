//! Entities of the narrative world.

mod character;
mod event;
mod relationship;
mod scene;

pub use character::Character;
pub use event::Event;
pub use relationship::{Relationship, RelationshipKey};
pub use scene::{Scene, UNSPECIFIED_TIME_PERIOD};
