//! Scene and event upserts.

use std::sync::Arc;

use storygraph_domain::{ChapterNumber, Event, Scene};
use tracing::debug;

use super::error::IngestError;
use crate::infrastructure::ports::{EventRepo, SceneRepo};

pub struct SceneEvents {
    scenes: Arc<dyn SceneRepo>,
    events: Arc<dyn EventRepo>,
}

impl SceneEvents {
    pub fn new(scenes: Arc<dyn SceneRepo>, events: Arc<dyn EventRepo>) -> Self {
        Self { scenes, events }
    }

    /// Create the scene, or update the supplied fields of an existing one.
    ///
    /// An unset time period becomes `UNSPECIFIED`. The scene's chapter is
    /// the chapter of the latest write.
    pub async fn upsert_scene(
        &self,
        chapter: ChapterNumber,
        scene: Scene,
    ) -> Result<Scene, IngestError> {
        let merged = match self.scenes.get(&scene.id).await? {
            Some(stored) => {
                let mut existing = stored.scene;
                existing.merge(scene);
                existing
            }
            None => scene,
        }
        .with_defaults();

        self.scenes.save(chapter, &merged).await?;
        debug!(scene_id = %merged.id, chapter = %chapter, "Upserted scene");
        Ok(merged)
    }

    /// Store the event, replacing its properties and links wholesale.
    pub async fn upsert_event(
        &self,
        chapter: ChapterNumber,
        event: Event,
    ) -> Result<(), IngestError> {
        self.events.save(chapter, &event).await?;
        debug!(
            event_id = %event.id,
            chapter = %chapter,
            participants = event.participants.len(),
            "Upserted event"
        );
        Ok(())
    }
}
