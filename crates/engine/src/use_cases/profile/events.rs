//! Direct event lookups.

use std::sync::Arc;

use storygraph_domain::EventId;

use super::error::EventLookupError;
use crate::infrastructure::ports::{EventRepo, StoredEvent};

pub struct EventLookup {
    events: Arc<dyn EventRepo>,
}

impl EventLookup {
    pub fn new(events: Arc<dyn EventRepo>) -> Self {
        Self { events }
    }

    pub async fn get_event(&self, id: &EventId) -> Result<StoredEvent, EventLookupError> {
        self.events
            .get(id)
            .await?
            .ok_or_else(|| EventLookupError::NotFound(id.clone()))
    }

    /// The event's details text.
    pub async fn get_event_details(&self, id: &EventId) -> Result<String, EventLookupError> {
        let stored = self.get_event(id).await?;
        stored
            .event
            .details
            .filter(|details| !details.trim().is_empty())
            .ok_or_else(|| EventLookupError::NoDetails(id.clone()))
    }
}
