//! Event entity - something that happens in a scene during one chapter

use serde::{Deserialize, Deserializer, Serialize};

use crate::common::lenient;
use crate::{CharacterId, EmotionalImpact, EventId, SceneId};

fn participant_list<'de, D>(deserializer: D) -> Result<Vec<CharacterId>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient::string_list(deserializer)?
        .into_iter()
        .map(|raw| CharacterId::new(raw).map_err(serde::de::Error::custom))
        .collect()
}

fn order_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}

/// Documents use `""` for "no scene"; treat it as absent.
fn optional_scene_id<'de, D>(deserializer: D) -> Result<Option<SceneId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        Some(raw) if !raw.trim().is_empty() => {
            SceneId::new(raw).map(Some).map_err(serde::de::Error::custom)
        }
        _ => Ok(None),
    }
}

/// An event as asserted by a chapter document.
///
/// Events are chapter-local and not mutated after the chapter that
/// introduces them; re-asserting an event replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    /// Sequencing index within the chapter.
    #[serde(default, deserialize_with = "order_or_zero")]
    pub order: i64,
    #[serde(default, deserialize_with = "optional_scene_id")]
    pub scene_id: Option<SceneId>,
    #[serde(default, deserialize_with = "participant_list")]
    pub participants: Vec<CharacterId>,
    #[serde(default)]
    pub emotional_impact: EmotionalImpact,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub consequences: Vec<String>,
}

impl Event {
    pub fn new(id: EventId) -> Self {
        Self {
            id,
            name: None,
            details: None,
            order: 0,
            scene_id: None,
            participants: Vec::new(),
            emotional_impact: EmotionalImpact::default(),
            consequences: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    pub fn in_scene(mut self, scene_id: SceneId) -> Self {
        self.scene_id = Some(scene_id);
        self
    }

    pub fn with_participants(mut self, participants: Vec<CharacterId>) -> Self {
        self.participants = participants;
        self
    }

    pub fn with_emotional_impact(mut self, impact: EmotionalImpact) -> Self {
        self.emotional_impact = impact;
        self
    }

    pub fn with_consequences(mut self, consequences: Vec<String>) -> Self {
        self.consequences = consequences;
        self
    }

    pub fn involves(&self, character_id: &CharacterId) -> bool {
        self.participants.contains(character_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_event_deserializes_with_defaults() {
        let event: Event = serde_json::from_str(r#"{"id":"e1"}"#).expect("deserialize");
        assert_eq!(event.order, 0);
        assert!(event.participants.is_empty());
        assert!(event.emotional_impact.is_empty());
        assert!(event.consequences.is_empty());
        assert_eq!(event.scene_id, None);
    }

    #[test]
    fn blank_scene_id_means_no_scene() {
        let event: Event =
            serde_json::from_str(r#"{"id":"e1","scene_id":""}"#).expect("deserialize");
        assert_eq!(event.scene_id, None);
    }

    #[test]
    fn document_event_full_shape() {
        let event: Event = serde_json::from_str(
            r#"{"id":"e1","name":"Secret Meeting","order":1,"scene_id":"s1",
                "details":"p1 and p2 discuss the repayment plan",
                "participants":["p1","p2"],
                "emotional_impact":{"p1":"Anxious","p2":"Confident"},
                "consequences":"Repayment deadline extended"}"#,
        )
        .expect("deserialize");

        assert_eq!(event.participants.len(), 2);
        assert_eq!(
            event.emotional_impact.get(&CharacterId::new("p2").expect("id")),
            Some("Confident")
        );
        assert_eq!(event.consequences, vec!["Repayment deadline extended".to_string()]);
    }

    #[test]
    fn empty_participant_id_is_rejected() {
        assert!(serde_json::from_str::<Event>(r#"{"id":"e1","participants":[""]}"#).is_err());
    }
}
