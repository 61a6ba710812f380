//! Staging for one chapter commit.
//!
//! A [`PendingBatch`] collects the character updates and relationship edits
//! of one document before the versioning engine applies them. It lives for
//! exactly one commit.

use std::collections::HashMap;

use storygraph_domain::{
    ChapterDocument, ChapterNumber, Character, CharacterId, Relationship, RelationshipKey,
};

/// Result of putting a relationship into a [`RelationshipSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

/// Relationships keyed by ordered pair, in first-seen order.
///
/// Replacing an entry keeps its position, so inherited edges stay in
/// inherited order and new pairs follow in edit order.
#[derive(Debug, Clone, Default)]
pub struct RelationshipSet {
    entries: Vec<Relationship>,
    index: HashMap<RelationshipKey, usize>,
}

impl RelationshipSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, relationship: Relationship) -> Upsert {
        let key = relationship.key();
        match self.index.get(&key) {
            Some(&position) => {
                self.entries[position] = relationship;
                Upsert::Replaced
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(relationship);
                Upsert::Inserted
            }
        }
    }

    pub fn contains(&self, key: &RelationshipKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Relationship> {
        self.entries
    }
}

impl FromIterator<Relationship> for RelationshipSet {
    fn from_iter<T: IntoIterator<Item = Relationship>>(iter: T) -> Self {
        let mut set = Self::new();
        for relationship in iter {
            set.upsert(relationship);
        }
        set
    }
}

/// Pending writes for one chapter.
#[derive(Debug, Clone)]
pub struct PendingBatch {
    chapter: ChapterNumber,
    characters: Vec<Character>,
    character_index: HashMap<CharacterId, usize>,
    relationships: RelationshipSet,
}

impl PendingBatch {
    pub fn new(chapter: ChapterNumber) -> Self {
        Self {
            chapter,
            characters: Vec::new(),
            character_index: HashMap::new(),
            relationships: RelationshipSet::new(),
        }
    }

    /// Stage the characters and relationships of a document.
    pub fn from_document(chapter: ChapterNumber, document: &ChapterDocument) -> Self {
        let mut batch = Self::new(chapter);
        for character in &document.characters {
            batch.stage_character(character.clone());
        }
        for relationship in &document.relationships {
            batch.stage_relationship(relationship.clone());
        }
        batch
    }

    /// Stage a character update; repeated ids merge field by field.
    pub fn stage_character(&mut self, character: Character) {
        match self.character_index.get(&character.id) {
            Some(&position) => self.characters[position].merge(character),
            None => {
                self.character_index
                    .insert(character.id.clone(), self.characters.len());
                self.characters.push(character);
            }
        }
    }

    /// Stage a relationship edit; a later edit for the same pair wins.
    pub fn stage_relationship(&mut self, relationship: Relationship) {
        self.relationships
            .upsert(relationship.at_chapter(self.chapter));
    }

    pub fn chapter(&self) -> ChapterNumber {
        self.chapter
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn relationships(&self) -> &RelationshipSet {
        &self.relationships
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.relationships.is_empty()
    }

    pub fn into_parts(self) -> (Vec<Character>, Vec<Relationship>) {
        (self.characters, self.relationships.into_vec())
    }
}
