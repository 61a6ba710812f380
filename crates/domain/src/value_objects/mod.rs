//! Value objects for the chapter-versioned data model.

mod emotional_impact;
mod intensity;

pub use emotional_impact::{EmotionalImpact, NO_IMPACT_RECORD};
pub use intensity::Intensity;
