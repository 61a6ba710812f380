//! Chapter-scoped read queries: profiles, event windows, event lookups.

mod character_profile;
mod error;
mod event_window;
mod events;

use std::sync::Arc;

use crate::infrastructure::ports::{CharacterRepo, EventRepo};

pub use character_profile::CharacterProfiles;
pub use error::{EventLookupError, ProfileError};
pub use event_window::{EventWindows, DEFAULT_WINDOW_LIMIT};
pub use events::EventLookup;

/// Container for the read-side use cases.
pub struct ProfileUseCases {
    pub profiles: Arc<CharacterProfiles>,
    pub windows: Arc<EventWindows>,
    pub events: Arc<EventLookup>,
}

impl ProfileUseCases {
    pub fn new(characters: Arc<dyn CharacterRepo>, events: Arc<dyn EventRepo>) -> Self {
        let profiles = Arc::new(CharacterProfiles::new(characters, events.clone()));
        Self {
            windows: Arc::new(EventWindows::new(profiles.clone(), events.clone())),
            events: Arc::new(EventLookup::new(events)),
            profiles,
        }
    }
}
