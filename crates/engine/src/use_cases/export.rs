//! Per-chapter memory export.

use std::sync::Arc;

use serde::Serialize;
use storygraph_domain::{ChapterNumber, CharacterId};
use tracing::{info, warn};

use crate::infrastructure::ports::{CharacterRepo, ProfileSink, RepoError};
use crate::use_cases::profile::{CharacterProfiles, ProfileError};

/// Failures that abort the whole export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// A character whose memory the sink rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportFailure {
    pub character_id: CharacterId,
    pub error: String,
}

/// Where each character's memory landed, and which ones did not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub chapter: ChapterNumber,
    pub written: Vec<String>,
    pub failed: Vec<ExportFailure>,
}

pub struct ExportProfiles {
    characters: Arc<dyn CharacterRepo>,
    profiles: Arc<CharacterProfiles>,
    sink: Arc<dyn ProfileSink>,
}

impl ExportProfiles {
    pub fn new(
        characters: Arc<dyn CharacterRepo>,
        profiles: Arc<CharacterProfiles>,
        sink: Arc<dyn ProfileSink>,
    ) -> Self {
        Self {
            characters,
            profiles,
            sink,
        }
    }

    /// Write one memory document for every character with a version at
    /// `chapter`.
    ///
    /// A sink failure for one character is recorded in the summary and the
    /// remaining characters are still written.
    pub async fn save_profiles_for_chapter(
        &self,
        chapter: ChapterNumber,
    ) -> Result<ExportSummary, ExportError> {
        let mut ids: Vec<_> = self
            .characters
            .list_versions(chapter)
            .await?
            .into_iter()
            .map(|character| character.id)
            .collect();
        ids.sort();

        let mut written = Vec::with_capacity(ids.len());
        let mut failed = Vec::new();
        for id in ids {
            let memory = self.profiles.get_memory(&id, chapter).await?;
            match self.sink.write(&memory).await {
                Ok(location) => written.push(location),
                Err(e) => {
                    warn!(
                        chapter = %chapter,
                        character_id = %id,
                        error = %e,
                        "Failed to export character memory"
                    );
                    failed.push(ExportFailure {
                        character_id: id,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            chapter = %chapter,
            written = written.len(),
            failed = failed.len(),
            "Exported character memories"
        );
        Ok(ExportSummary {
            chapter,
            written,
            failed,
        })
    }
}
