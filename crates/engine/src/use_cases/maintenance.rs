//! Chapter maintenance and diagnostics.

use std::sync::Arc;

use storygraph_domain::{ChapterNumber, CharacterId, RelationshipCheckReport};
use tracing::{info, warn};

use crate::infrastructure::ports::{CharacterRepo, MaintenanceRepo, RepoError};
use crate::use_cases::ingest::WriteLock;

pub struct Maintenance {
    characters: Arc<dyn CharacterRepo>,
    maintenance: Arc<dyn MaintenanceRepo>,
    write_lock: WriteLock,
}

impl Maintenance {
    pub fn new(
        characters: Arc<dyn CharacterRepo>,
        maintenance: Arc<dyn MaintenanceRepo>,
        write_lock: WriteLock,
    ) -> Self {
        Self {
            characters,
            maintenance,
            write_lock,
        }
    }

    /// Remove everything tagged with `chapter`. Other chapters are untouched.
    pub async fn clear_chapter(&self, chapter: ChapterNumber) -> Result<(), RepoError> {
        let _guard = self.write_lock.lock().await;
        self.maintenance.clear_chapter(chapter).await?;
        info!(chapter = %chapter, "Cleared chapter");
        Ok(())
    }

    pub async fn clear_all_chapters(&self) -> Result<(), RepoError> {
        let _guard = self.write_lock.lock().await;
        self.maintenance.clear_all().await?;
        info!("Cleared all chapters");
        Ok(())
    }

    /// Ids of the characters with a version at `chapter`, sorted.
    pub async fn list_chapter_characters(
        &self,
        chapter: ChapterNumber,
    ) -> Result<Vec<CharacterId>, RepoError> {
        let mut ids: Vec<CharacterId> = self
            .characters
            .list_versions(chapter)
            .await?
            .into_iter()
            .map(|character| character.id)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    /// Count relationship edges per ordered pair at `chapter`.
    pub async fn check_chapter_relationships(
        &self,
        chapter: ChapterNumber,
    ) -> Result<RelationshipCheckReport, RepoError> {
        let entries = self.characters.relationship_edge_counts(chapter).await?;
        let report = RelationshipCheckReport::new(chapter, entries);

        for entry in report.entries.iter().filter(|e| e.is_duplicate()) {
            warn!(
                chapter = %chapter,
                from_id = %entry.from_id,
                to_id = %entry.to_id,
                count = entry.count,
                "Duplicate relationship edges"
            );
        }
        Ok(report)
    }
}
