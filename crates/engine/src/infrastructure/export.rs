//! Filesystem profile sink.
//!
//! Writes `<base>/chapter_<N>_memories/<character_id>_memory.json`, pretty
//! printed UTF-8 JSON, one file per character. Ids are percent-encoded in
//! file names, so every file stays inside its chapter directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use storygraph_domain::{ChapterNumber, CharacterId, CharacterMemory};

use crate::infrastructure::ports::{ProfileSink, SinkError};

pub struct FileProfileSink {
    base_dir: PathBuf,
}

impl FileProfileSink {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn chapter_dir(&self, chapter: ChapterNumber) -> PathBuf {
        self.base_dir.join(format!("chapter_{}_memories", chapter))
    }

    pub fn memory_path(&self, chapter: ChapterNumber, character_id: &CharacterId) -> PathBuf {
        self.chapter_dir(chapter)
            .join(format!("{}_memory.json", file_stem(character_id)))
    }
}

/// Keep ASCII alphanumerics, `-` and `_`; percent-encode every other byte.
///
/// Separators and dots never reach the file system, so `..` and `a/b` cannot
/// name another directory.
fn file_stem(character_id: &CharacterId) -> String {
    let mut stem = String::with_capacity(character_id.as_str().len());
    for byte in character_id.as_str().bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}

#[async_trait]
impl ProfileSink for FileProfileSink {
    async fn write(&self, memory: &CharacterMemory) -> Result<String, SinkError> {
        let dir = self.chapter_dir(memory.chapter);
        tokio::fs::create_dir_all(&dir).await?;

        let path = self.memory_path(memory.chapter, &memory.properties.id);
        let json = serde_json::to_string_pretty(memory)?;
        tokio::fs::write(&path, json).await?;

        tracing::debug!(path = %path.display(), "Wrote character memory");
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storygraph_domain::Character;

    #[tokio::test]
    async fn writes_memory_under_chapter_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = FileProfileSink::new(dir.path());
        let id = CharacterId::new("p1").expect("id");
        let memory = CharacterMemory {
            chapter: ChapterNumber::new(2),
            properties: Character::new(id.clone()).with_name("Lin"),
            relationships: vec![],
            events: vec![],
        };

        let written = sink.write(&memory).await.expect("write");

        let expected = dir.path().join("chapter_2_memories").join("p1_memory.json");
        assert_eq!(written, expected.display().to_string());

        let contents = tokio::fs::read_to_string(&expected).await.expect("read");
        let parsed: serde_json::Value = serde_json::from_str(&contents).expect("json");
        assert_eq!(parsed["chapter"], 2);
        assert_eq!(parsed["properties"]["name"], "Lin");
    }

    fn memory_for(id: &str) -> CharacterMemory {
        CharacterMemory {
            chapter: ChapterNumber::BOOTSTRAP,
            properties: Character::new(CharacterId::new(id).expect("id")),
            relationships: vec![],
            events: vec![],
        }
    }

    #[test]
    fn plain_ids_keep_their_file_name() {
        let sink = FileProfileSink::new("out");
        let path = sink.memory_path(ChapterNumber::new(1), &CharacterId::new("p_1-x").expect("id"));
        assert_eq!(path, PathBuf::from("out/chapter_1_memories/p_1-x_memory.json"));
    }

    #[tokio::test]
    async fn path_like_ids_stay_inside_chapter_directory() {
        let root = tempfile::tempdir().expect("tempdir");
        let base = root.path().join("memory");
        let sink = FileProfileSink::new(&base);
        let chapter_dir = sink.chapter_dir(ChapterNumber::BOOTSTRAP);

        for id in ["../../escaped", "a/b", "..", "sub\\dir"] {
            let written = sink.write(&memory_for(id)).await.expect("write");
            let path = PathBuf::from(&written);
            assert_eq!(path.parent(), Some(chapter_dir.as_path()), "id {id}");
            assert!(path.exists(), "id {id}");
        }

        assert!(!root.path().join("escaped_memory.json").exists());
        assert!(!base.join("escaped_memory.json").exists());
        assert!(chapter_dir
            .join("%2E%2E%2F%2E%2E%2Fescaped_memory.json")
            .exists());
        assert!(chapter_dir.join("a%2Fb_memory.json").exists());
    }
}
