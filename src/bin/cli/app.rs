use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use vocab_lib::config::Config;
use vocab_lib::vocabulary::{
    NewWord, ReviewStats, Scheduler, SystemClock, VocabularyItem, VocabularyStorage,
};

/// Shared application state for CLI commands
pub struct App {
    pub config: Config,
    pub config_path: PathBuf,
    pub storage: VocabularyStorage,
}

impl App {
    /// Resolve the data directory, load config and open storage
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let root = match data_dir {
            Some(dir) => dir,
            None => VocabularyStorage::default_data_dir().context("Failed to get data directory")?,
        };

        let config_path = Config::path_in(&root);
        let config = Config::load(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;

        let words_root = config.data_dir.clone().unwrap_or(root);
        let storage = VocabularyStorage::new(words_root);
        storage.init().context("Failed to initialize storage")?;

        Ok(Self {
            config,
            config_path,
            storage,
        })
    }

    pub fn scheduler(&self) -> Arc<Scheduler> {
        Arc::new(Scheduler::new(
            Arc::new(self.storage.clone()),
            Arc::new(SystemClock),
        ))
    }

    pub fn list_words(&self) -> Result<Vec<VocabularyItem>> {
        self.storage.list_items().context("Failed to list words")
    }

    pub fn add_word(&self, mut new_word: NewWord) -> Result<VocabularyItem> {
        if new_word.word.trim().is_empty() {
            bail!("Word must not be empty");
        }
        if new_word.alpha.is_none() {
            new_word.alpha = Some(self.config.scheduler.default_alpha);
        }
        self.storage.create_item(new_word).context("Failed to add word")
    }

    /// Find a word (case-insensitive, exact match first, then unique prefix)
    pub fn find_word(&self, name: &str) -> Result<VocabularyItem> {
        let words = self.list_words()?;
        let name_lower = name.trim().to_lowercase();

        if let Some(item) = words.iter().find(|w| w.word.to_lowercase() == name_lower) {
            return Ok(item.clone());
        }

        let matches: Vec<&VocabularyItem> = words
            .iter()
            .filter(|w| w.word.to_lowercase().starts_with(&name_lower))
            .collect();

        match matches.len() {
            0 => bail!("No word matching '{}'", name),
            1 => Ok(matches[0].clone()),
            _ => bail!(
                "Ambiguous word '{}'. Matches:\n{}",
                name,
                matches
                    .iter()
                    .map(|w| format!("  - {}", w.word))
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
        }
    }

    pub fn remove_word(&self, item: &VocabularyItem) -> Result<()> {
        self.storage.delete_item(item.id).context("Failed to remove word")
    }

    pub fn stats(&self) -> Result<ReviewStats> {
        self.storage
            .review_stats(chrono::Utc::now())
            .context("Failed to compute statistics")
    }
}
