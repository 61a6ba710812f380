//! Character profile reconstruction.

use std::sync::Arc;

use storygraph_domain::{
    ChapterNumber, CharacterId, CharacterMemory, EmotionalImpact, Profile, ProfileEvent,
    NO_IMPACT_RECORD,
};
use tracing::warn;

use super::error::ProfileError;
use crate::infrastructure::ports::{CharacterRepo, EventRepo, ParticipationRecord};

pub struct CharacterProfiles {
    characters: Arc<dyn CharacterRepo>,
    events: Arc<dyn EventRepo>,
}

impl CharacterProfiles {
    pub fn new(characters: Arc<dyn CharacterRepo>, events: Arc<dyn EventRepo>) -> Self {
        Self { characters, events }
    }

    /// The character's version at `chapter` with its outgoing relationships
    /// and participated events of that chapter.
    pub async fn get_profile(
        &self,
        character_id: &CharacterId,
        chapter: ChapterNumber,
    ) -> Result<Profile, ProfileError> {
        let properties = self
            .characters
            .get_version(character_id, chapter)
            .await?
            .ok_or_else(|| ProfileError::NotFound {
                character_id: character_id.clone(),
                chapter,
            })?;

        let relationships = self.characters.list_outgoing(character_id, chapter).await?;
        let events = self.participated_events(character_id, chapter).await?;

        Ok(Profile {
            chapter,
            properties,
            relationships,
            events,
        })
    }

    pub async fn get_memory(
        &self,
        character_id: &CharacterId,
        chapter: ChapterNumber,
    ) -> Result<CharacterMemory, ProfileError> {
        self.get_profile(character_id, chapter)
            .await
            .map(CharacterMemory::from)
    }

    async fn participated_events(
        &self,
        character_id: &CharacterId,
        chapter: ChapterNumber,
    ) -> Result<Vec<ProfileEvent>, ProfileError> {
        let mut records = self
            .events
            .list_participated(character_id, chapter)
            .await?;
        records.sort_by(|a, b| {
            a.event_order
                .cmp(&b.event_order)
                .then_with(|| a.event_id.as_str().cmp(b.event_id.as_str()))
        });

        Ok(records
            .into_iter()
            .map(|record| to_profile_event(record, character_id))
            .collect())
    }
}

fn to_profile_event(record: ParticipationRecord, character_id: &CharacterId) -> ProfileEvent {
    let emotional_impact = impact_for(
        record.emotional_impact.as_deref(),
        character_id,
        record.event_id.as_str(),
    );
    ProfileEvent {
        event_id: record.event_id,
        event_name: record.event_name,
        event_order: record.event_order,
        details: record.details,
        scene_id: record.scene_id,
        scene_name: record.scene_name,
        scene_place: record.scene_place,
        emotional_impact,
        consequences: record.consequences,
    }
}

/// This character's impact entry, or the "No record" sentinel.
fn impact_for(stored: Option<&str>, character_id: &CharacterId, event_id: &str) -> String {
    match EmotionalImpact::lookup_stored(stored, character_id) {
        Ok(Some(effect)) => effect,
        Ok(None) => NO_IMPACT_RECORD.to_string(),
        Err(e) => {
            warn!(
                event_id = %event_id,
                character_id = %character_id,
                error = %e,
                "Stored emotional impact is malformed"
            );
            NO_IMPACT_RECORD.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockCharacterRepo, MockEventRepo};
    use storygraph_domain::{Character, EventId};

    fn cid(s: &str) -> CharacterId {
        CharacterId::new(s).expect("valid id")
    }

    fn record(id: &str, order: i64, impact: Option<&str>) -> ParticipationRecord {
        ParticipationRecord {
            event_id: EventId::new(id).expect("valid id"),
            event_name: Some(format!("Event {}", id)),
            event_order: order,
            details: None,
            scene_id: None,
            scene_name: None,
            scene_place: None,
            emotional_impact: impact.map(str::to_string),
            consequences: vec![],
        }
    }

    #[tokio::test]
    async fn missing_version_is_not_found() {
        let mut characters = MockCharacterRepo::new();
        characters.expect_get_version().returning(|_, _| Ok(None));

        let profiles = CharacterProfiles::new(Arc::new(characters), Arc::new(MockEventRepo::new()));
        let err = profiles
            .get_profile(&cid("p1"), ChapterNumber::new(4))
            .await
            .expect_err("not found");

        assert!(matches!(err, ProfileError::NotFound { .. }));
    }

    #[tokio::test]
    async fn impact_extracted_per_character_with_sentinel_fallback() {
        let mut characters = MockCharacterRepo::new();
        characters
            .expect_get_version()
            .returning(|id, _| Ok(Some(Character::new(id.clone()).with_name("Lin"))));
        characters.expect_list_outgoing().returning(|_, _| Ok(vec![]));

        let mut events = MockEventRepo::new();
        events.expect_list_participated().returning(|_, _| {
            Ok(vec![
                record("e3", 3, Some("not json")),
                record("e1", 1, Some(r#"{"p1":"grateful","p2":"wary"}"#)),
                record("e2", 2, Some("{}")),
                record("e0", 0, None),
            ])
        });

        let profiles = CharacterProfiles::new(Arc::new(characters), Arc::new(events));
        let profile = profiles
            .get_profile(&cid("p1"), ChapterNumber::new(1))
            .await
            .expect("profile");

        let impacts: Vec<&str> = profile
            .events
            .iter()
            .map(|e| e.emotional_impact.as_str())
            .collect();
        assert_eq!(
            impacts,
            vec![NO_IMPACT_RECORD, "grateful", NO_IMPACT_RECORD, NO_IMPACT_RECORD]
        );
        assert_eq!(profile.events[1].event_id.as_str(), "e1");
    }

    #[tokio::test]
    async fn memory_mirrors_profile() {
        let mut characters = MockCharacterRepo::new();
        characters
            .expect_get_version()
            .returning(|id, _| Ok(Some(Character::new(id.clone()))));
        characters.expect_list_outgoing().returning(|_, _| Ok(vec![]));
        let mut events = MockEventRepo::new();
        events.expect_list_participated().returning(|_, _| Ok(vec![]));

        let profiles = CharacterProfiles::new(Arc::new(characters), Arc::new(events));
        let memory = profiles
            .get_memory(&cid("p2"), ChapterNumber::new(2))
            .await
            .expect("memory");

        assert_eq!(memory.chapter, ChapterNumber::new(2));
        assert_eq!(memory.properties.id.as_str(), "p2");
    }
}
