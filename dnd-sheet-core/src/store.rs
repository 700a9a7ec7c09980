//! File-based character store.
//!
//! Each character lives in its own pretty-printed JSON file inside the store
//! directory, wrapped in a small versioned envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::character::Character;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("No character named {0:?}")]
    NotFound(String),
}

/// Current character file version.
const SAVE_VERSION: u32 = 1;

/// On-disk envelope around a character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedCharacter {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub character: Character,
}

/// Enough about a stored character to list it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSummary {
    pub path: PathBuf,
    pub name: String,
    pub class_name: String,
    pub level: u8,
}

/// A directory of character files.
#[derive(Debug, Clone)]
pub struct CharacterStore {
    dir: PathBuf,
}

impl CharacterStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a character with this name is stored in.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_name(name)))
    }

    /// Write the character, creating the store directory if needed.
    pub async fn save(&self, character: &Character) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.dir).await?;

        let saved = SavedCharacter {
            version: SAVE_VERSION,
            saved_at: Utc::now(),
            character: character.clone(),
        };
        let path = self.path_for(&character.name);
        let content = serde_json::to_string_pretty(&saved)?;
        fs::write(&path, content).await?;

        info!(name = %character.name, path = %path.display(), "character saved");
        Ok(path)
    }

    /// Load a character file from any path.
    pub async fn load(path: impl AsRef<Path>) -> Result<Character, StoreError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let saved: SavedCharacter = serde_json::from_str(&content)?;

        if saved.version != SAVE_VERSION {
            return Err(StoreError::VersionMismatch {
                expected: SAVE_VERSION,
                found: saved.version,
            });
        }

        debug!(path = %path.display(), "character loaded");
        Ok(saved.character)
    }

    /// Load a character from this store by name.
    pub async fn load_by_name(&self, name: &str) -> Result<Character, StoreError> {
        let path = self.path_for(name);
        if !fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(name.to_string()));
        }
        Self::load(path).await
    }

    /// List stored characters sorted by name, skipping unreadable files.
    pub async fn list(&self) -> Result<Vec<CharacterSummary>, StoreError> {
        let mut summaries = Vec::new();
        if !fs::try_exists(&self.dir).await? {
            return Ok(summaries);
        }

        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }

            match Self::load(&path).await {
                Ok(character) => summaries.push(CharacterSummary {
                    path,
                    name: character.name,
                    class_name: character.class_name,
                    level: character.level,
                }),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable character file"),
            }
        }

        summaries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(summaries)
    }

    /// Remove a stored character.
    pub async fn delete(&self, name: &str) -> Result<(), StoreError> {
        let path = self.path_for(name);
        if !fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(name.to_string()));
        }
        fs::remove_file(&path).await?;
        info!(name, "character deleted");
        Ok(())
    }
}

/// File-system safe version of a character name.
fn sanitize_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    if sanitized.is_empty() {
        "unnamed".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Thorin Oakenshield"), "Thorin_Oakenshield");
        assert_eq!(sanitize_name("../etc/passwd"), "___etc_passwd");
        assert_eq!(sanitize_name("   "), "unnamed");
    }

    #[test]
    fn test_path_for() {
        let store = CharacterStore::new("/tmp/chars");
        assert_eq!(
            store.path_for("Brom"),
            PathBuf::from("/tmp/chars/Brom.json")
        );
    }
}
