//! Chapter documents produced by the story generator.
//!
//! One document per chapter. Chapter 0's document (the initial data) also
//! carries the story title and background, and its relationships are the
//! bootstrap relationship set.

use serde::{Deserialize, Serialize};

use crate::{ChapterNumber, Character, Event, Relationship, Scene};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterDocument {
    /// Absent in initial-data documents, which are always chapter 0.
    #[serde(default)]
    pub chapter: Option<ChapterNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, alias = "persons")]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl ChapterDocument {
    pub fn new(chapter: ChapterNumber) -> Self {
        Self {
            chapter: Some(chapter),
            ..Self::default()
        }
    }

    pub fn with_characters(mut self, characters: Vec<Character>) -> Self {
        self.characters = characters;
        self
    }

    pub fn with_relationships(mut self, relationships: Vec<Relationship>) -> Self {
        self.relationships = relationships;
        self
    }

    pub fn with_scenes(mut self, scenes: Vec<Scene>) -> Self {
        self.scenes = scenes;
        self
    }

    pub fn with_events(mut self, events: Vec<Event>) -> Self {
        self.events = events;
        self
    }

    /// Stated chapter, or the bootstrap chapter when none is stated.
    pub fn chapter_or_bootstrap(&self) -> ChapterNumber {
        self.chapter.unwrap_or(ChapterNumber::BOOTSTRAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_data_without_chapter_is_bootstrap() {
        let doc: ChapterDocument = serde_json::from_str(
            r#"{"title":"The Debt","background":"A port city",
                "persons":[{"id":"p1","name":"Lin"},{"id":"p2","name":"Wei"}],
                "relationships":[{"from_id":"p1","to_id":"p2","type":"DEBT","intensity":5}]}"#,
        )
        .expect("deserialize");

        assert_eq!(doc.chapter_or_bootstrap(), ChapterNumber::BOOTSTRAP);
        assert_eq!(doc.characters.len(), 2);
        assert_eq!(doc.relationships.len(), 1);
        assert!(doc.scenes.is_empty());
    }

    #[test]
    fn chapter_document_keeps_number() {
        let doc: ChapterDocument =
            serde_json::from_str(r#"{"chapter": 4, "events": []}"#).expect("deserialize");
        assert_eq!(doc.chapter, Some(ChapterNumber::new(4)));
    }
}
