//! Chapter ingestion.
//!
//! A document is applied in three steps: the versioning engine writes the
//! chapter's characters and relationships, then scenes, then events. The
//! write lock is held until the last event is saved.

mod error;
mod scene_events;
mod staging;
mod versioning;

use std::sync::Arc;

use serde_json::Value;
use storygraph_domain::{ChapterDocument, ChapterNumber};
use tracing::info;

use crate::infrastructure::ports::{CharacterRepo, EventRepo, SceneRepo};

pub use error::IngestError;
pub use scene_events::SceneEvents;
pub use staging::{PendingBatch, RelationshipSet, Upsert};
pub use versioning::{ChapterVersioning, CommitSummary, WriteGuard, WriteLock};

/// Sections whose entries must carry non-empty ids, with the fields checked.
const REQUIRED_IDS: &[(&str, &[&str])] = &[
    ("characters", &["id"]),
    ("persons", &["id"]),
    ("relationships", &["from_id", "to_id"]),
    ("scenes", &["id"]),
    ("events", &["id"]),
];

/// Parse a raw document, naming the first entry whose id is absent, blank or
/// not a string.
pub fn parse_document(value: Value) -> Result<ChapterDocument, IngestError> {
    for (section, fields) in REQUIRED_IDS {
        let Some(entries) = value.get(*section).and_then(Value::as_array) else {
            continue;
        };
        for (index, entry) in entries.iter().enumerate() {
            for field in fields.iter() {
                match entry.get(*field) {
                    Some(Value::String(id)) if !id.trim().is_empty() => {}
                    None | Some(Value::Null) | Some(Value::String(_)) => {
                        return Err(IngestError::MissingId {
                            kind: *section,
                            index,
                            field: *field,
                        });
                    }
                    Some(other) => {
                        return Err(IngestError::Malformed(format!(
                            "{section}[{index}].{field} must be a string, got {other}"
                        )));
                    }
                }
            }
        }
    }

    serde_json::from_value(value).map_err(|e| IngestError::Malformed(e.to_string()))
}

pub struct IngestChapter {
    versioning: ChapterVersioning,
    scene_events: SceneEvents,
    write_lock: WriteLock,
}

impl IngestChapter {
    pub fn new(
        characters: Arc<dyn CharacterRepo>,
        scenes: Arc<dyn SceneRepo>,
        events: Arc<dyn EventRepo>,
        write_lock: WriteLock,
    ) -> Self {
        Self {
            versioning: ChapterVersioning::new(characters),
            scene_events: SceneEvents::new(scenes, events),
            write_lock,
        }
    }

    /// Load the initial data as chapter 0.
    pub async fn load_bootstrap(
        &self,
        document: ChapterDocument,
    ) -> Result<CommitSummary, IngestError> {
        let chapter = document.chapter_or_bootstrap();
        if !chapter.is_bootstrap() {
            return Err(IngestError::InvalidChapter(format!(
                "initial data must be chapter 0, got {}",
                chapter
            )));
        }
        self.apply(chapter, document).await
    }

    /// Commit a chapter document (chapter 1 or later).
    pub async fn commit_chapter(
        &self,
        document: ChapterDocument,
    ) -> Result<CommitSummary, IngestError> {
        let chapter = document
            .chapter
            .ok_or_else(|| IngestError::InvalidChapter("document has no chapter".to_string()))?;
        if chapter.is_bootstrap() {
            return Err(IngestError::InvalidChapter(
                "chapter 0 is loaded as initial data".to_string(),
            ));
        }
        self.apply(chapter, document).await
    }

    async fn apply(
        &self,
        chapter: ChapterNumber,
        document: ChapterDocument,
    ) -> Result<CommitSummary, IngestError> {
        let guard = self.write_lock.lock().await;
        let batch = PendingBatch::from_document(chapter, &document);
        let summary = self.versioning.commit(&guard, batch).await?;

        let scene_count = document.scenes.len();
        let event_count = document.events.len();
        for scene in document.scenes {
            self.scene_events.upsert_scene(chapter, scene).await?;
        }
        for event in document.events {
            self.scene_events.upsert_event(chapter, event).await?;
        }

        info!(
            chapter = %chapter,
            scenes = scene_count,
            events = event_count,
            "Ingested chapter document"
        );
        Ok(summary)
    }
}
