//! Storage operations for vocabulary items
//!
//! Directory structure:
//! ```text
//! {data-dir}/
//! ├── config.toml
//! └── words/
//!     └── {item-id}.json   # One record per vocabulary item
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::models::{is_valid_alpha, ItemPatch, NewWord, ReviewStats, VocabularyItem};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Word not found: {0}")]
    ItemNotFound(Uuid),

    #[error("Word already exists: {0}")]
    DuplicateWord(String),

    #[error("Smoothing factor must be in (0, 1], got {0}")]
    InvalidAlpha(f64),

    #[error("Data directory not found")]
    DataDirNotFound,

    #[error("Background task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Write side of the store as seen by the scheduler
#[async_trait]
pub trait ItemUpdater: Send + Sync {
    async fn update_item(&self, id: Uuid, patch: ItemPatch) -> Result<()>;
}

/// File-backed vocabulary store
#[derive(Debug, Clone)]
pub struct VocabularyStorage {
    base_path: PathBuf,
}

impl VocabularyStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Default data directory (e.g., ~/.local/share/vocab)
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("vocab"))
            .ok_or(StorageError::DataDirNotFound)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn words_dir(&self) -> PathBuf {
        self.base_path.join("words")
    }

    fn item_path(&self, id: Uuid) -> PathBuf {
        self.words_dir().join(format!("{}.json", id))
    }

    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(self.words_dir())?;
        Ok(())
    }

    fn read_item(&self, path: &Path) -> Result<VocabularyItem> {
        let content = fs::read_to_string(path)?;
        let mut item: VocabularyItem = serde_json::from_str(&content)?;
        if item.repair() {
            log::warn!("Repaired inconsistent record for '{}' ({})", item.word, item.id);
        }
        Ok(item)
    }

    /// Atomic write (write to .tmp then rename)
    fn write_item(&self, item: &VocabularyItem) -> Result<()> {
        let path = self.item_path(item.id);
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(item)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Load every item, oldest first. Unreadable records are logged and skipped.
    pub fn list_items(&self) -> Result<Vec<VocabularyItem>> {
        let words_dir = self.words_dir();
        if !words_dir.exists() {
            return Ok(Vec::new());
        }

        let mut items = Vec::new();
        for entry in fs::read_dir(&words_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                match self.read_item(&path) {
                    Ok(item) => items.push(item),
                    Err(e) => log::warn!("Skipping unreadable record {}: {}", path.display(), e),
                }
            }
        }

        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.word.cmp(&b.word)));
        Ok(items)
    }

    pub fn get_item(&self, id: Uuid) -> Result<VocabularyItem> {
        let path = self.item_path(id);
        if !path.exists() {
            return Err(StorageError::ItemNotFound(id));
        }
        self.read_item(&path)
    }

    /// Case-insensitive lookup by the word itself
    pub fn find_by_word(&self, word: &str) -> Result<Option<VocabularyItem>> {
        let needle = word.trim().to_lowercase();
        Ok(self
            .list_items()?
            .into_iter()
            .find(|item| item.word.to_lowercase() == needle))
    }

    pub fn create_item(&self, new_word: NewWord) -> Result<VocabularyItem> {
        self.create_item_at(new_word, Utc::now())
    }

    pub fn create_item_at(&self, new_word: NewWord, now: DateTime<Utc>) -> Result<VocabularyItem> {
        self.init()?;

        if let Some(alpha) = new_word.alpha {
            if !is_valid_alpha(alpha) {
                return Err(StorageError::InvalidAlpha(alpha));
            }
        }

        if self.find_by_word(&new_word.word)?.is_some() {
            return Err(StorageError::DuplicateWord(new_word.word));
        }

        let item = new_word.into_item(now);
        self.write_item(&item)?;
        log::debug!("Created word '{}' ({})", item.word, item.id);
        Ok(item)
    }

    /// Merge a scheduler patch into the stored record
    pub fn apply_patch(&self, id: Uuid, patch: &ItemPatch) -> Result<VocabularyItem> {
        let mut item = self.get_item(id)?;
        patch.apply_to(&mut item);
        self.write_item(&item)?;
        Ok(item)
    }

    pub fn delete_item(&self, id: Uuid) -> Result<()> {
        let path = self.item_path(id);
        if !path.exists() {
            return Err(StorageError::ItemNotFound(id));
        }
        fs::remove_file(path)?;
        Ok(())
    }

    pub fn review_stats(&self, now: DateTime<Utc>) -> Result<ReviewStats> {
        let items = self.list_items()?;
        Ok(ReviewStats::from_items(&items, now))
    }
}

#[async_trait]
impl ItemUpdater for VocabularyStorage {
    async fn update_item(&self, id: Uuid, patch: ItemPatch) -> Result<()> {
        let storage = self.clone();
        tokio::task::spawn_blocking(move || storage.apply_patch(id, &patch).map(|_| ()))
            .await
            .map_err(|e| StorageError::Task(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::models::{Attempt, ItemStatus};
    use chrono::Duration;
    use tempfile::TempDir;

    fn create_test_storage() -> (VocabularyStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = VocabularyStorage::new(temp_dir.path().to_path_buf());
        storage.init().unwrap();
        (storage, temp_dir)
    }

    fn word(word: &str, definition: &str) -> NewWord {
        NewWord {
            word: word.to_string(),
            definition: definition.to_string(),
            ..Default::default()
        }
    }

    fn patch_at(now: DateTime<Utc>) -> ItemPatch {
        ItemPatch {
            accuracy: 0.6,
            repetitions: 1,
            status: ItemStatus::Learning,
            last_quality: 3,
            last_reviewed_at: now,
            next_review_at: now + Duration::days(1),
            recent_attempts: vec![Attempt { quality: 3, at: now }],
            updated_at: now,
        }
    }

    #[test]
    fn test_create_and_get_item() {
        let (storage, _temp) = create_test_storage();

        let mut new_word = word("Schmetterling", "butterfly");
        new_word.examples = vec!["Der Schmetterling fliegt.".to_string()];
        new_word.word_type = Some("noun".to_string());

        let created = storage.create_item(new_word).unwrap();
        assert_eq!(created.status(), ItemStatus::New);

        let loaded = storage.get_item(created.id).unwrap();
        assert_eq!(loaded.word, "Schmetterling");
        assert_eq!(loaded.examples.len(), 1);
        assert_eq!(loaded.word_type.as_deref(), Some("noun"));
    }

    #[test]
    fn test_duplicate_word_rejected() {
        let (storage, _temp) = create_test_storage();
        storage.create_item(word("gato", "cat")).unwrap();

        let result = storage.create_item(word("Gato", "cat"));
        assert!(matches!(result, Err(StorageError::DuplicateWord(_))));
    }

    #[test]
    fn test_list_items_in_creation_order() {
        let (storage, _temp) = create_test_storage();
        let now = Utc::now();

        for (i, w) in ["uno", "dos", "tres"].iter().enumerate() {
            storage
                .create_item_at(word(w, w), now + Duration::seconds(i as i64))
                .unwrap();
        }

        let words: Vec<String> = storage.list_items().unwrap().into_iter().map(|i| i.word).collect();
        assert_eq!(words, vec!["uno", "dos", "tres"]);
    }

    #[test]
    fn test_apply_patch() {
        let (storage, _temp) = create_test_storage();
        let item = storage.create_item(word("perro", "dog")).unwrap();
        let now = Utc::now();

        let updated = storage.apply_patch(item.id, &patch_at(now)).unwrap();
        assert_eq!(updated.repetitions, 1);
        assert_eq!(updated.last_quality, Some(3));

        let reloaded = storage.get_item(item.id).unwrap();
        assert_eq!(reloaded.status(), ItemStatus::Learning);
        assert_eq!(reloaded.next_review_at, Some(now + Duration::days(1)));
        assert_eq!(reloaded.definition, "dog");
    }

    #[test]
    fn test_apply_patch_missing_item() {
        let (storage, _temp) = create_test_storage();
        let result = storage.apply_patch(Uuid::new_v4(), &patch_at(Utc::now()));
        assert!(matches!(result, Err(StorageError::ItemNotFound(_))));
    }

    #[test]
    fn test_load_repairs_status() {
        let (storage, _temp) = create_test_storage();
        let item = storage.create_item(word("casa", "house")).unwrap();

        let mut raw = item.clone();
        raw.status = ItemStatus::Mastered;
        storage.write_item(&raw).unwrap();

        let loaded = storage.get_item(item.id).unwrap();
        assert_eq!(loaded.status(), ItemStatus::New);
    }

    #[test]
    fn test_delete_item() {
        let (storage, _temp) = create_test_storage();
        let item = storage.create_item(word("luna", "moon")).unwrap();

        storage.delete_item(item.id).unwrap();
        assert!(storage.list_items().unwrap().is_empty());
        assert!(matches!(storage.delete_item(item.id), Err(StorageError::ItemNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_item_async() {
        let (storage, _temp) = create_test_storage();
        let item = storage.create_item(word("sol", "sun")).unwrap();

        storage.update_item(item.id, patch_at(Utc::now())).await.unwrap();
        assert_eq!(storage.get_item(item.id).unwrap().repetitions, 1);
    }

    #[test]
    fn test_invalid_alpha_rejected() {
        let (storage, _temp) = create_test_storage();

        for alpha in [0.0, -0.1, 5.0, f64::NAN] {
            let mut new_word = word("agua", "water");
            new_word.alpha = Some(alpha);
            assert!(matches!(storage.create_item(new_word), Err(StorageError::InvalidAlpha(_))));
        }
        assert!(storage.list_items().unwrap().is_empty());

        let mut new_word = word("agua", "water");
        new_word.alpha = Some(1.0);
        assert_eq!(storage.create_item(new_word).unwrap().alpha, 1.0);
    }

    #[test]
    fn test_write_leaves_no_temp_file() {
        let (storage, temp) = create_test_storage();
        let item = storage.create_item(word("fuego", "fire")).unwrap();
        storage.apply_patch(item.id, &patch_at(Utc::now())).unwrap();

        let names: Vec<String> = fs::read_dir(temp.path().join("words"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![format!("{}.json", item.id)]);
    }

    #[test]
    fn test_list_skips_damaged_record() {
        let (storage, _temp) = create_test_storage();
        let healthy = storage.create_item(word("tierra", "earth")).unwrap();
        let damaged = storage.create_item(word("aire", "air")).unwrap();

        let path = storage.item_path(damaged.id);
        let content = fs::read_to_string(&path).unwrap();
        fs::write(&path, &content[..content.len() / 2]).unwrap();

        let items = storage.list_items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, healthy.id);
        assert!(matches!(storage.get_item(damaged.id), Err(StorageError::Json(_))));
    }
}
