//! Scene entity - where and when a group of events happens
//!
//! Scenes are chapter-local: they are asserted in the chapter that introduces
//! them and are never carried forward.

use serde::{Deserialize, Serialize};

use crate::SceneId;

/// Time period recorded when a scene does not state one.
pub const UNSPECIFIED_TIME_PERIOD: &str = "UNSPECIFIED";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub time_period: Option<String>,
    #[serde(default)]
    pub atmosphere: Option<String>,
    #[serde(default)]
    pub pov_character: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

impl Scene {
    pub fn new(id: SceneId) -> Self {
        Self {
            id,
            name: None,
            place: None,
            time_period: None,
            atmosphere: None,
            pov_character: None,
            owner: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_place(mut self, place: impl Into<String>) -> Self {
        self.place = Some(place.into());
        self
    }

    pub fn with_time_period(mut self, time_period: impl Into<String>) -> Self {
        self.time_period = Some(time_period.into());
        self
    }

    pub fn with_atmosphere(mut self, atmosphere: impl Into<String>) -> Self {
        self.atmosphere = Some(atmosphere.into());
        self
    }

    /// Fill unset fields from the default scene record.
    ///
    /// Only `time_period` has a non-empty default.
    pub fn with_defaults(mut self) -> Self {
        if self.time_period.is_none() {
            self.time_period = Some(UNSPECIFIED_TIME_PERIOD.to_string());
        }
        self
    }

    /// Merge a later assertion of the same scene; supplied fields win.
    pub fn merge(&mut self, update: Scene) {
        fn take(slot: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.name, update.name);
        take(&mut self.place, update.place);
        take(&mut self.time_period, update.time_period);
        take(&mut self.atmosphere, update.atmosphere);
        take(&mut self.pov_character, update.pov_character);
        take(&mut self.owner, update.owner);
    }
}
