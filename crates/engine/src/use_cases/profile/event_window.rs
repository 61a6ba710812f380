//! Lookback and lookahead event windows.

use std::sync::Arc;

use storygraph_domain::{
    ChapterNumber, CharacterId, EventWindow, RecalledEvent, UpcomingEvent,
};
use tracing::debug;

use super::character_profile::CharacterProfiles;
use super::error::ProfileError;
use crate::infrastructure::ports::EventRepo;

/// Default number of events returned by a window.
pub const DEFAULT_WINDOW_LIMIT: usize = 2;

/// How many chapters a window spans.
const WINDOW_SPAN: u32 = 2;

pub struct EventWindows {
    profiles: Arc<CharacterProfiles>,
    events: Arc<dyn EventRepo>,
}

impl EventWindows {
    pub fn new(profiles: Arc<CharacterProfiles>, events: Arc<dyn EventRepo>) -> Self {
        Self { profiles, events }
    }

    /// Events the character took part in during the two chapters before
    /// `current`, chapter 0 excluded.
    ///
    /// Chapters where the character has no version are skipped.
    pub async fn lookback(
        &self,
        character_id: &CharacterId,
        current: ChapterNumber,
        limit: usize,
    ) -> Result<EventWindow<RecalledEvent>, ProfileError> {
        let last = match current.value().checked_sub(1) {
            Some(last) if last >= 1 => last,
            _ => return Ok(EventWindow::empty()),
        };
        let first = current.value().saturating_sub(WINDOW_SPAN).max(1);

        let mut recalled = Vec::new();
        for value in first..=last {
            let chapter = ChapterNumber::new(value);
            match self.profiles.get_profile(character_id, chapter).await {
                Ok(profile) => recalled.extend(
                    profile
                        .events
                        .into_iter()
                        .map(|event| RecalledEvent { chapter, event }),
                ),
                Err(ProfileError::NotFound { .. }) => {
                    debug!(
                        character_id = %character_id,
                        chapter = %chapter,
                        "No version in lookback chapter; skipping"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Ok(EventWindow::collect(recalled, limit))
    }

    /// Events of the chapters after `current`, at most two chapters ahead
    /// and never past `end`.
    pub async fn lookahead(
        &self,
        current: ChapterNumber,
        end: ChapterNumber,
        limit: usize,
    ) -> Result<EventWindow<UpcomingEvent>, ProfileError> {
        if current >= end {
            return Ok(EventWindow::empty());
        }
        let through = ChapterNumber::new(current.value().saturating_add(WINDOW_SPAN)).min(end);

        let upcoming = self.events.list_between(current, through).await?;
        Ok(EventWindow::collect(upcoming, limit))
    }
}
