//! Chapter versioning.
//!
//! Committing chapter N builds N's complete character and relationship sets
//! from chapter N-1 plus the staged edits, then replaces whatever chapter N
//! held before. Chapter 0 is built from its inputs alone.
//!
//! A commit runs under the shared [`WriteLock`]; the caller passes in the
//! guard so the lock can also cover whatever else it writes for the chapter.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use storygraph_domain::{ChapterNumber, Character, CharacterId, Relationship};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::error::IngestError;
use super::staging::{PendingBatch, RelationshipSet, Upsert};
use crate::infrastructure::ports::{ChapterWrite, CharacterRepo};

/// Serializes every chapter-rewriting operation.
pub type WriteLock = Arc<Mutex<()>>;

/// Proof that the caller holds the [`WriteLock`].
pub type WriteGuard<'a> = MutexGuard<'a, ()>;

/// Counts reported after a chapter commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub chapter: ChapterNumber,
    pub characters_written: usize,
    pub relationships_inherited: usize,
    pub relationships_overridden: usize,
    pub relationships_added: usize,
    pub relationships_skipped: usize,
}

pub struct ChapterVersioning {
    characters: Arc<dyn CharacterRepo>,
}

impl ChapterVersioning {
    pub fn new(characters: Arc<dyn CharacterRepo>) -> Self {
        Self { characters }
    }

    /// Apply a staged batch, producing the chapter's full state.
    ///
    /// Committing the same batch twice leaves the store as after the first
    /// commit.
    pub async fn commit(
        &self,
        _guard: &WriteGuard<'_>,
        batch: PendingBatch,
    ) -> Result<CommitSummary, IngestError> {
        let chapter = batch.chapter();
        let mut summary = CommitSummary {
            chapter,
            ..CommitSummary::default()
        };

        let (mut characters, mut relationships) = match chapter.previous() {
            Some(previous) => self.inherit(previous, chapter, &mut summary).await?,
            None => (BTreeMap::new(), RelationshipSet::new()),
        };

        let (updates, edits) = batch.into_parts();
        for update in updates {
            match characters.remove(&update.id) {
                Some(existing) => {
                    characters.insert(update.id.clone(), existing.merged(update));
                }
                None => {
                    characters.insert(update.id.clone(), update);
                }
            }
        }

        for edit in edits {
            match relationships.upsert(edit) {
                Upsert::Replaced => summary.relationships_overridden += 1,
                Upsert::Inserted => summary.relationships_added += 1,
            }
        }

        let mut kept = Vec::with_capacity(relationships.len());
        for relationship in relationships.into_vec() {
            if characters.contains_key(&relationship.from_id)
                && characters.contains_key(&relationship.to_id)
            {
                kept.push(relationship);
            } else {
                warn!(
                    chapter = %chapter,
                    from_id = %relationship.from_id,
                    to_id = %relationship.to_id,
                    "Skipping relationship with missing endpoint"
                );
                summary.relationships_skipped += 1;
            }
        }

        let write = ChapterWrite {
            chapter,
            characters: characters.into_values().collect(),
            relationships: kept,
        };
        summary.characters_written = write.characters.len();
        self.characters.write_chapter(&write).await?;

        info!(
            chapter = %chapter,
            characters = summary.characters_written,
            inherited = summary.relationships_inherited,
            overridden = summary.relationships_overridden,
            added = summary.relationships_added,
            skipped = summary.relationships_skipped,
            "Committed chapter"
        );
        Ok(summary)
    }

    async fn inherit(
        &self,
        previous: ChapterNumber,
        chapter: ChapterNumber,
        summary: &mut CommitSummary,
    ) -> Result<(BTreeMap<CharacterId, Character>, RelationshipSet), IngestError> {
        let prior_characters = self.characters.list_versions(previous).await?;
        let prior_relationships = self.characters.list_relationships(previous).await?;

        if prior_characters.is_empty() && prior_relationships.is_empty() {
            warn!(
                chapter = %chapter,
                previous = %previous,
                "Previous chapter is empty; starting from an empty state"
            );
        } else {
            debug!(
                chapter = %chapter,
                characters = prior_characters.len(),
                relationships = prior_relationships.len(),
                "Inheriting previous chapter"
            );
        }

        let characters = prior_characters
            .into_iter()
            .map(|character| (character.id.clone(), character))
            .collect();
        let relationships: RelationshipSet = prior_relationships
            .into_iter()
            .map(|relationship: Relationship| relationship.at_chapter(chapter))
            .collect();
        summary.relationships_inherited = relationships.len();

        Ok((characters, relationships))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockCharacterRepo, RepoError};
    use storygraph_domain::Intensity;

    fn cid(s: &str) -> CharacterId {
        CharacterId::new(s).expect("valid id")
    }

    fn lock() -> WriteLock {
        Arc::new(Mutex::new(()))
    }

    #[tokio::test]
    async fn bootstrap_writes_exactly_the_inputs() {
        let mut repo = MockCharacterRepo::new();
        repo.expect_list_versions().never();
        repo.expect_list_relationships().never();
        repo.expect_write_chapter()
            .withf(|write| {
                write.chapter == ChapterNumber::BOOTSTRAP
                    && write.characters.len() == 2
                    && write.relationships.len() == 1
                    && write.relationships[0].kind == "DEBT"
            })
            .times(1)
            .returning(|_| Ok(()));

        let mut batch = PendingBatch::new(ChapterNumber::BOOTSTRAP);
        batch.stage_character(Character::new(cid("p1")).with_name("Lin"));
        batch.stage_character(Character::new(cid("p2")).with_name("Mo"));
        batch.stage_relationship(Relationship::new(cid("p1"), cid("p2"), "DEBT"));

        let write_lock = lock();
        let guard = write_lock.lock().await;
        let summary = ChapterVersioning::new(Arc::new(repo))
            .commit(&guard, batch)
            .await
            .expect("commit");

        assert_eq!(summary.characters_written, 2);
        assert_eq!(summary.relationships_added, 1);
        assert_eq!(summary.relationships_inherited, 0);
    }

    #[tokio::test]
    async fn chapter_inherits_and_overrides_previous() {
        let mut repo = MockCharacterRepo::new();
        repo.expect_list_versions()
            .withf(|chapter| *chapter == ChapterNumber::new(0))
            .returning(|_| {
                Ok(vec![
                    Character::new(cid("p1")).with_name("Lin").with_health("Fine"),
                    Character::new(cid("p2")).with_name("Mo"),
                ])
            });
        repo.expect_list_relationships().returning(|_| {
            Ok(vec![Relationship::new(cid("p1"), cid("p2"), "DEBT")
                .with_intensity(Intensity::new(4).expect("intensity"))])
        });
        repo.expect_write_chapter()
            .withf(|write| {
                let p1 = write.characters.iter().find(|c| c.id.as_str() == "p1");
                write.chapter == ChapterNumber::new(1)
                    && write.characters.len() == 2
                    && p1.is_some_and(|c| {
                        c.name.as_deref() == Some("Lin") && c.health.as_deref() == Some("Wounded")
                    })
                    && write.relationships.len() == 1
                    && write.relationships[0].kind == "ALLY"
                    && write.relationships[0].chapter == ChapterNumber::new(1)
            })
            .times(1)
            .returning(|_| Ok(()));

        let mut batch = PendingBatch::new(ChapterNumber::new(1));
        batch.stage_character(Character::new(cid("p1")).with_health("Wounded"));
        batch.stage_relationship(Relationship::new(cid("p1"), cid("p2"), "ALLY"));

        let write_lock = lock();
        let guard = write_lock.lock().await;
        let summary = ChapterVersioning::new(Arc::new(repo))
            .commit(&guard, batch)
            .await
            .expect("commit");

        assert_eq!(summary.relationships_inherited, 1);
        assert_eq!(summary.relationships_overridden, 1);
        assert_eq!(summary.relationships_added, 0);
    }

    #[tokio::test]
    async fn relationships_with_missing_endpoint_are_skipped() {
        let mut repo = MockCharacterRepo::new();
        repo.expect_list_versions()
            .returning(|_| Ok(vec![Character::new(cid("p1"))]));
        repo.expect_list_relationships().returning(|_| Ok(vec![]));
        repo.expect_write_chapter()
            .withf(|write| write.relationships.is_empty())
            .times(1)
            .returning(|_| Ok(()));

        let mut batch = PendingBatch::new(ChapterNumber::new(2));
        batch.stage_relationship(Relationship::new(cid("p1"), cid("ghost"), "FEAR"));

        let write_lock = lock();
        let guard = write_lock.lock().await;
        let summary = ChapterVersioning::new(Arc::new(repo))
            .commit(&guard, batch)
            .await
            .expect("commit");

        assert_eq!(summary.relationships_skipped, 1);
        assert_eq!(summary.characters_written, 1);
    }

    #[tokio::test]
    async fn empty_previous_chapter_still_commits() {
        let mut repo = MockCharacterRepo::new();
        repo.expect_list_versions().returning(|_| Ok(vec![]));
        repo.expect_list_relationships().returning(|_| Ok(vec![]));
        repo.expect_write_chapter()
            .withf(|write| write.characters.len() == 1)
            .times(1)
            .returning(|_| Ok(()));

        let mut batch = PendingBatch::new(ChapterNumber::new(5));
        batch.stage_character(Character::new(cid("p9")));

        let write_lock = lock();
        let guard = write_lock.lock().await;
        let summary = ChapterVersioning::new(Arc::new(repo))
            .commit(&guard, batch)
            .await
            .expect("commit");
        assert_eq!(summary.characters_written, 1);
    }

    #[tokio::test]
    async fn failed_write_surfaces_as_repo_error() {
        let mut repo = MockCharacterRepo::new();
        repo.expect_list_versions().returning(|_| Ok(vec![]));
        repo.expect_list_relationships().returning(|_| Ok(vec![]));
        repo.expect_write_chapter()
            .returning(|_| Err(RepoError::database("write_chapter", "connection reset")));

        let mut batch = PendingBatch::new(ChapterNumber::new(1));
        batch.stage_character(Character::new(cid("p1")));

        let write_lock = lock();
        let guard = write_lock.lock().await;
        let err = ChapterVersioning::new(Arc::new(repo))
            .commit(&guard, batch)
            .await
            .expect_err("write fails");
        assert!(matches!(err, IngestError::Repo(RepoError::Database { .. })));
    }
}
