//! Data models for vocabulary items and practice sessions

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of attempts kept in an item's recent window
pub const RECENT_WINDOW: usize = 5;

/// Default EWMA smoothing factor for new items
pub const DEFAULT_ALPHA: f64 = 0.2;

/// Mastery status of a vocabulary item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ItemStatus {
    /// Never reviewed
    #[default]
    New,
    /// Reviewed at least once, not yet mastered
    Learning,
    /// Five or more reviews with high accuracy
    Mastered,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Learning => write!(f, "learning"),
            Self::Mastered => write!(f, "mastered"),
        }
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(Self::New),
            "learning" => Ok(Self::Learning),
            "mastered" => Ok(Self::Mastered),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

/// One graded answer in an item's recent window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub quality: i32,
    pub at: DateTime<Utc>,
}

/// A word the learner is studying
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyItem {
    pub id: Uuid,
    pub word: String,
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipa: Option<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    /// Grammatical category (noun, verb, ...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub word_type: Option<String>,
    /// EWMA of quality/5, always within [0, 1]
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default)]
    pub repetitions: u32,
    /// Only the scheduler and the load-time repair change this
    #[serde(default)]
    pub(crate) status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_quality: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review_at: Option<DateTime<Utc>>,
    /// Oldest first, at most [`RECENT_WINDOW`] entries
    #[serde(default)]
    pub recent_attempts: Vec<Attempt>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

impl VocabularyItem {
    pub fn new(word: String, definition: String) -> Self {
        Self::new_at(word, definition, Utc::now())
    }

    pub fn new_at(word: String, definition: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            word,
            definition,
            ipa: None,
            examples: Vec::new(),
            word_type: None,
            accuracy: 0.0,
            alpha: DEFAULT_ALPHA,
            repetitions: 0,
            status: ItemStatus::New,
            last_quality: None,
            last_reviewed_at: None,
            next_review_at: None,
            recent_attempts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    /// Due when a review date exists and has passed. Items without a date are never due.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.repetitions > 0 && self.next_review_at.map_or(false, |at| at <= now)
    }

    /// Bring a record loaded from outside the scheduler back within its invariants.
    /// Returns true when anything was changed.
    pub fn repair(&mut self) -> bool {
        let mut changed = false;

        let expected = match (self.repetitions, self.status) {
            (0, _) => ItemStatus::New,
            (_, ItemStatus::New) => ItemStatus::Learning,
            (_, status) => status,
        };
        if expected != self.status {
            self.status = expected;
            changed = true;
        }

        let clamped = clamp_accuracy(self.accuracy);
        if clamped != self.accuracy {
            self.accuracy = clamped;
            changed = true;
        }

        if self.recent_attempts.len() > RECENT_WINDOW {
            let excess = self.recent_attempts.len() - RECENT_WINDOW;
            self.recent_attempts.drain(..excess);
            changed = true;
        }

        changed
    }
}

/// Smoothing factors must lie in (0, 1]
pub fn is_valid_alpha(alpha: f64) -> bool {
    alpha > 0.0 && alpha <= 1.0
}

/// Clamp into [0, 1], mapping NaN to 0
pub(crate) fn clamp_accuracy(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Fields the scheduler writes after one review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    pub accuracy: f64,
    pub repetitions: u32,
    pub status: ItemStatus,
    pub last_quality: i32,
    pub last_reviewed_at: DateTime<Utc>,
    pub next_review_at: DateTime<Utc>,
    pub recent_attempts: Vec<Attempt>,
    pub updated_at: DateTime<Utc>,
}

impl ItemPatch {
    pub fn apply_to(&self, item: &mut VocabularyItem) {
        item.accuracy = self.accuracy;
        item.repetitions = self.repetitions;
        item.status = self.status;
        item.last_quality = Some(self.last_quality);
        item.last_reviewed_at = Some(self.last_reviewed_at);
        item.next_review_at = Some(self.next_review_at);
        item.recent_attempts = self.recent_attempts.clone();
        item.updated_at = self.updated_at;
    }
}

/// Input for the add-word flow
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWord {
    pub word: String,
    pub definition: String,
    #[serde(default)]
    pub ipa: Option<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(rename = "type", default)]
    pub word_type: Option<String>,
    #[serde(default)]
    pub alpha: Option<f64>,
}

impl NewWord {
    pub fn into_item(self, now: DateTime<Utc>) -> VocabularyItem {
        let mut item = VocabularyItem::new_at(self.word, self.definition, now);
        item.ipa = self.ipa;
        item.examples = self.examples;
        item.word_type = self.word_type;
        if let Some(alpha) = self.alpha {
            item.alpha = alpha;
        }
        item
    }
}

/// Exercise modality of one practice occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExerciseKind {
    /// Flashcard: learner self-grades 1, 3 or 5
    Guess,
    /// Learner types the word; graded 5 or 1
    Write,
}

/// Which modalities a session should contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseType {
    GuessOnly,
    WriteOnly,
    #[default]
    Both,
}

impl FromStr for ExerciseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "guess-only" | "guess" | "flashcards" => Ok(Self::GuessOnly),
            "write-only" | "write" => Ok(Self::WriteOnly),
            "both" => Ok(Self::Both),
            other => Err(format!("unknown exercise type: {}", other)),
        }
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GuessOnly => write!(f, "guess-only"),
            Self::WriteOnly => write!(f, "write-only"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// One occurrence of a word in a practice session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeItem {
    /// Snapshot of the word, refreshed in memory after every review
    pub word_data: VocabularyItem,
    #[serde(rename = "type")]
    pub kind: ExerciseKind,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub session_attempts: u32,
    #[serde(default)]
    pub session_consecutive_fails: u32,
    /// Newest last, at most [`RECENT_WINDOW`] entries
    #[serde(default)]
    pub recent_qualities: Vec<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_shown_at: Option<DateTime<Utc>>,
}

impl PracticeItem {
    pub fn new(word_data: VocabularyItem, kind: ExerciseKind) -> Self {
        Self {
            word_data,
            kind,
            completed: false,
            session_attempts: 0,
            session_consecutive_fails: 0,
            recent_qualities: Vec::new(),
            last_shown_at: None,
        }
    }

    pub(crate) fn record_answer(&mut self, quality: i32, at: DateTime<Utc>) {
        self.session_attempts += 1;
        if quality <= 1 {
            self.session_consecutive_fails += 1;
        } else {
            self.session_consecutive_fails = 0;
        }
        self.recent_qualities.push(quality);
        if self.recent_qualities.len() > RECENT_WINDOW {
            self.recent_qualities.remove(0);
        }
        self.last_shown_at = Some(at);
    }
}

/// Statistics over a learner's vocabulary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_words: usize,
    pub new_words: usize,
    pub learning_words: usize,
    pub mastered_words: usize,
    pub due_words: usize,
    pub average_accuracy: f64,
}

impl ReviewStats {
    pub fn from_items(items: &[VocabularyItem], now: DateTime<Utc>) -> Self {
        let mut stats = Self {
            total_words: items.len(),
            ..Self::default()
        };

        let mut accuracy_sum = 0.0;
        let mut reviewed = 0usize;

        for item in items {
            match item.status {
                ItemStatus::New => stats.new_words += 1,
                ItemStatus::Learning => stats.learning_words += 1,
                ItemStatus::Mastered => stats.mastered_words += 1,
            }
            if item.is_due(now) {
                stats.due_words += 1;
            }
            if item.repetitions > 0 {
                accuracy_sum += item.accuracy;
                reviewed += 1;
            }
        }

        if reviewed > 0 {
            stats.average_accuracy = accuracy_sum / reviewed as f64;
        }

        stats
    }
}
