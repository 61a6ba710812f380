use storygraph_domain::{ChapterNumber, CharacterId, EventId};

use crate::infrastructure::ports::RepoError;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Character {character_id} has no version at chapter {chapter}")]
    NotFound {
        character_id: CharacterId,
        chapter: ChapterNumber,
    },
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

#[derive(Debug, thiserror::Error)]
pub enum EventLookupError {
    #[error("Event not found: {0}")]
    NotFound(EventId),
    #[error("Event {0} has no details")]
    NoDetails(EventId),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}
