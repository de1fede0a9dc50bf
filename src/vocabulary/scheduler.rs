//! Review scheduling
//!
//! Each review blends the response into an exponentially weighted accuracy,
//! reclassifies the item and picks the next review date:
//!
//! - 5+ reviews with accuracy >= 0.8: mastered, back in 21 days
//! - mastered but slipping (accuracy < 0.6, or two recent failures): learning, back tomorrow
//! - otherwise learning, with an interval doubling on the prior review count (capped at 60 days)
//!
//! Quality is expected to be 1 (forgot), 3 (partial) or 5 (knew it). Other
//! values are accepted and run through the same formulas.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::clock::Clock;
use super::models::{clamp_accuracy, Attempt, ItemPatch, ItemStatus, VocabularyItem, RECENT_WINDOW};
use super::storage::ItemUpdater;

const MASTERY_REPETITIONS: u32 = 5;
const MASTERY_ACCURACY: f64 = 0.8;
const DEMOTION_ACCURACY: f64 = 0.6;
const MASTERED_INTERVAL_DAYS: i64 = 21;
const RELEARN_INTERVAL_DAYS: i64 = 1;
const MAX_LEARNING_INTERVAL_DAYS: i64 = 60;
/// Failures older than this no longer count against a mastered item
const POOR_RECENCY_DAYS: i64 = 14;
const POOR_QUALITY: i32 = 1;

/// Result of one review: the item as it should look now, and the fields to persist
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub item: VocabularyItem,
    pub patch: ItemPatch,
}

impl ReviewOutcome {
    pub fn interval_days(&self) -> i64 {
        (self.patch.next_review_at - self.patch.last_reviewed_at).num_days()
    }
}

/// Days until the next review for an item staying in learning.
///
/// Spacing grows from the repetition count *before* this review, so the
/// first two successful reviews both come back after one day.
pub fn learning_interval_days(prior_repetitions: u32, quality: i32) -> i64 {
    if quality < 3 {
        return RELEARN_INTERVAL_DAYS;
    }
    let exponent = prior_repetitions.saturating_sub(1).min(63) as i32;
    let days = 2f64.powi(exponent).round();
    days.clamp(1.0, MAX_LEARNING_INTERVAL_DAYS as f64) as i64
}

/// Persisted attempts, then unpersisted session answers, then this answer; newest 5 kept
fn merge_recent_attempts(
    persisted: &[Attempt],
    session_qualities: &[i32],
    quality: i32,
    now: DateTime<Utc>,
) -> Vec<Attempt> {
    let mut window: Vec<Attempt> = persisted.to_vec();
    window.extend(session_qualities.iter().map(|&q| Attempt { quality: q, at: now }));
    window.push(Attempt { quality, at: now });

    if window.len() > RECENT_WINDOW {
        let excess = window.len() - RECENT_WINDOW;
        window.drain(..excess);
    }
    window
}

fn count_recent_failures(window: &[Attempt], now: DateTime<Utc>) -> usize {
    let cutoff = Duration::days(POOR_RECENCY_DAYS);
    window
        .iter()
        .filter(|a| a.quality <= POOR_QUALITY && now.signed_duration_since(a.at) <= cutoff)
        .count()
}

/// Apply one graded answer to an item. Pure: no I/O, no clock.
pub fn compute_review(
    item: &VocabularyItem,
    quality: i32,
    session_qualities: &[i32],
    now: DateTime<Utc>,
) -> ReviewOutcome {
    let prior_repetitions = item.repetitions;
    let repetitions = prior_repetitions.saturating_add(1);
    let observed = quality as f64 / 5.0;

    let accuracy = if prior_repetitions > 0 {
        clamp_accuracy((1.0 - item.alpha) * item.accuracy + item.alpha * observed)
    } else {
        clamp_accuracy(observed)
    };

    let recent_attempts = merge_recent_attempts(&item.recent_attempts, session_qualities, quality, now);
    let has_two_poor_recent = count_recent_failures(&recent_attempts, now) >= 2;

    let last_reviewed = item.last_reviewed_at.unwrap_or(now);
    let days_since_last_review = (now - last_reviewed).num_seconds().abs() as f64 / 86_400.0;

    let (status, interval_days) = if repetitions >= MASTERY_REPETITIONS && accuracy >= MASTERY_ACCURACY {
        (ItemStatus::Mastered, MASTERED_INTERVAL_DAYS)
    } else if item.status == ItemStatus::Mastered
        && (accuracy < DEMOTION_ACCURACY
            || (has_two_poor_recent && days_since_last_review <= POOR_RECENCY_DAYS as f64))
    {
        (ItemStatus::Learning, RELEARN_INTERVAL_DAYS)
    } else {
        (ItemStatus::Learning, learning_interval_days(prior_repetitions, quality))
    };

    let patch = ItemPatch {
        accuracy,
        repetitions,
        status,
        last_quality: quality,
        last_reviewed_at: now,
        next_review_at: now + Duration::days(interval_days),
        recent_attempts,
        updated_at: now,
    };

    log::debug!(
        "Reviewed '{}' q={} -> accuracy {:.3}, {} reps, {}, next in {}d",
        item.word,
        quality,
        accuracy,
        repetitions,
        status,
        interval_days
    );

    let mut updated = item.clone();
    patch.apply_to(&mut updated);

    ReviewOutcome { item: updated, patch }
}

/// Intervals in days for qualities 1, 3 and 5, for labelling answer buttons
pub fn preview_intervals(item: &VocabularyItem, now: DateTime<Utc>) -> [i64; 3] {
    [1, 3, 5].map(|q| compute_review(item, q, &[], now).interval_days())
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: i64) -> String {
    if days <= 0 {
        "now".to_string()
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}

/// Computes reviews and hands the resulting patches to storage without waiting.
/// Writes are chained so they land in the order the reviews were made.
pub struct Scheduler {
    updater: Arc<dyn ItemUpdater>,
    clock: Arc<dyn Clock>,
    last_write: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(updater: Arc<dyn ItemUpdater>, clock: Arc<dyn Clock>) -> Self {
        Self {
            updater,
            clock,
            last_write: Mutex::new(None),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Review an item. The returned outcome is final regardless of whether
    /// the write behind it succeeds.
    pub fn review(&self, item: &VocabularyItem, quality: i32, session_qualities: &[i32]) -> ReviewOutcome {
        let outcome = compute_review(item, quality, session_qualities, self.clock.now());
        self.persist(item.id, outcome.patch.clone());
        outcome
    }

    fn last_write(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.last_write.lock().unwrap_or_else(|poisoned| {
            log::warn!("Write queue lock was poisoned; recovering");
            poisoned.into_inner()
        })
    }

    fn persist(&self, id: uuid::Uuid, patch: ItemPatch) {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                log::error!("No async runtime; review of {} was not persisted", id);
                return;
            }
        };

        let updater = Arc::clone(&self.updater);
        let mut last_write = self.last_write();
        let previous = last_write.take();
        let task = handle.spawn(async move {
            // Patches land in review order
            if let Some(previous) = previous {
                if let Err(e) = previous.await {
                    log::error!("Earlier persist task aborted: {}", e);
                }
            }
            if let Err(e) = updater.update_item(id, patch).await {
                log::error!("Failed to persist review of {}: {}", id, e);
            }
        });
        *last_write = Some(task);
    }

    /// Wait for every write started so far
    pub async fn flush(&self) {
        let tail = self.last_write().take();
        if let Some(task) = tail {
            if let Err(e) = task.await {
                log::error!("Persist task aborted: {}", e);
            }
        }
    }
}
