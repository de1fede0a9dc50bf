//! Practice session assembly
//!
//! Words are picked in priority order until the session is full:
//! due reviews (earliest first), a trickle of new words, learning words
//! that aren't due yet, then mastered words. The selection is shuffled
//! and expanded into guess and/or write exercises.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::models::{ExerciseKind, ExerciseType, ItemStatus, PracticeItem, VocabularyItem};

/// Default number of words per session
pub const DEFAULT_SESSION_AMOUNT: usize = 10;

/// Share of a session that may be spent on never-seen words, as a divisor (1/5 = 20%)
const NEW_WORD_DIVISOR: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionParams {
    /// Number of words to select
    pub amount: usize,
    pub exercise_type: ExerciseType,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            amount: DEFAULT_SESSION_AMOUNT,
            exercise_type: ExerciseType::default(),
        }
    }
}

/// The vocabulary pool split by scheduling priority
#[derive(Debug, Default)]
pub struct SessionBuckets {
    pub due: Vec<VocabularyItem>,
    pub new_words: Vec<VocabularyItem>,
    pub learning_not_due: Vec<VocabularyItem>,
    pub mastered_not_due: Vec<VocabularyItem>,
}

impl SessionBuckets {
    pub fn partition(pool: &[VocabularyItem], now: DateTime<Utc>) -> Self {
        let mut buckets = Self::default();

        for item in pool {
            if item.repetitions == 0 {
                buckets.new_words.push(item.clone());
            } else if item.is_due(now) {
                buckets.due.push(item.clone());
            } else if item.status() == ItemStatus::Learning {
                buckets.learning_not_due.push(item.clone());
            } else {
                buckets.mastered_not_due.push(item.clone());
            }
        }

        buckets.due.sort_by(|a, b| {
            a.next_review_at
                .cmp(&b.next_review_at)
                .then_with(|| a.accuracy.total_cmp(&b.accuracy))
        });
        buckets.learning_not_due.sort_by(|a, b| a.accuracy.total_cmp(&b.accuracy));
        buckets.mastered_not_due.sort_by(|a, b| a.accuracy.total_cmp(&b.accuracy));

        buckets
    }
}

/// Pick up to `amount` words in priority order (not shuffled)
pub fn select_words(pool: &[VocabularyItem], amount: usize, now: DateTime<Utc>) -> Vec<VocabularyItem> {
    let SessionBuckets {
        due,
        new_words,
        learning_not_due,
        mastered_not_due,
    } = SessionBuckets::partition(pool, now);

    let mut selected = due;

    if selected.len() < amount {
        let quota = (amount / NEW_WORD_DIVISOR).max(1);
        selected.extend(new_words.into_iter().take(quota));
    }
    if selected.len() < amount {
        selected.extend(learning_not_due);
    }
    if selected.len() < amount {
        selected.extend(mastered_not_due);
    }

    selected.truncate(amount);
    selected
}

/// Build the exercise queue for one session
pub fn build_session<R: Rng + ?Sized>(
    pool: &[VocabularyItem],
    params: &SessionParams,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<PracticeItem> {
    let mut words = select_words(pool, params.amount, now);
    words.shuffle(rng);

    let items: Vec<PracticeItem> = match params.exercise_type {
        ExerciseType::GuessOnly => words
            .into_iter()
            .map(|w| PracticeItem::new(w, ExerciseKind::Guess))
            .collect(),
        ExerciseType::WriteOnly => words
            .into_iter()
            .map(|w| PracticeItem::new(w, ExerciseKind::Write))
            .collect(),
        ExerciseType::Both => {
            let mut items: Vec<PracticeItem> = words
                .into_iter()
                .flat_map(|w| {
                    [
                        PracticeItem::new(w.clone(), ExerciseKind::Guess),
                        PracticeItem::new(w, ExerciseKind::Write),
                    ]
                })
                .collect();
            items.shuffle(rng);
            items
        }
    };

    log::info!(
        "Built session: {} exercises from a pool of {} ({})",
        items.len(),
        pool.len(),
        params.exercise_type
    );

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-05-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn new_word(word: &str) -> VocabularyItem {
        VocabularyItem::new_at(word.to_string(), format!("{} (def)", word), now())
    }

    fn reviewed(word: &str, status: ItemStatus, accuracy: f64, due_in_days: i64) -> VocabularyItem {
        let mut item = new_word(word);
        item.repetitions = 3;
        item.status = status;
        item.accuracy = accuracy;
        item.next_review_at = Some(now() + Duration::days(due_in_days));
        item
    }

    fn words(items: &[VocabularyItem]) -> Vec<&str> {
        items.iter().map(|i| i.word.as_str()).collect()
    }

    #[test]
    fn test_empty_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        let session = build_session(&[], &SessionParams::default(), now(), &mut rng);
        assert!(session.is_empty());
    }

    #[test]
    fn test_zero_amount_selects_nothing() {
        let pool = vec![new_word("a"), reviewed("b", ItemStatus::Learning, 0.3, -1)];
        let mut rng = StdRng::seed_from_u64(1);
        let params = SessionParams { amount: 0, exercise_type: ExerciseType::Both };
        assert!(build_session(&pool, &params, now(), &mut rng).is_empty());
    }

    #[test]
    fn test_due_items_sorted_by_date_then_accuracy() {
        let pool = vec![
            reviewed("late", ItemStatus::Learning, 0.1, -1),
            reviewed("early-strong", ItemStatus::Mastered, 0.9, -5),
            reviewed("early-weak", ItemStatus::Learning, 0.2, -5),
        ];

        let selected = select_words(&pool, 10, now());
        assert_eq!(words(&selected), vec!["early-weak", "early-strong", "late"]);
    }

    #[test]
    fn test_three_due_items_expand_to_six() {
        let pool = vec![
            reviewed("x", ItemStatus::Learning, 0.5, -1),
            reviewed("y", ItemStatus::Learning, 0.5, -2),
            reviewed("z", ItemStatus::Learning, 0.5, -3),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let session = build_session(&pool, &SessionParams::default(), now(), &mut rng);

        assert_eq!(session.len(), 6);
        let guesses = session.iter().filter(|p| p.kind == ExerciseKind::Guess).count();
        assert_eq!(guesses, 3);
        let distinct: HashSet<_> = session.iter().map(|p| p.word_data.id).collect();
        assert_eq!(distinct.len(), 3);
        assert!(session.iter().all(|p| !p.completed));
    }

    #[test]
    fn test_single_modality_sessions() {
        let pool = vec![
            reviewed("x", ItemStatus::Learning, 0.5, -1),
            reviewed("y", ItemStatus::Learning, 0.5, -2),
        ];
        let mut rng = StdRng::seed_from_u64(3);

        let guess = SessionParams { amount: 10, exercise_type: ExerciseType::GuessOnly };
        let session = build_session(&pool, &guess, now(), &mut rng);
        assert_eq!(session.len(), 2);
        assert!(session.iter().all(|p| p.kind == ExerciseKind::Guess));

        let write = SessionParams { amount: 10, exercise_type: ExerciseType::WriteOnly };
        let session = build_session(&pool, &write, now(), &mut rng);
        assert_eq!(session.len(), 2);
        assert!(session.iter().all(|p| p.kind == ExerciseKind::Write));
    }

    #[test]
    fn test_new_words_capped_at_fifth_of_session() {
        let pool: Vec<VocabularyItem> = (0..8).map(|i| new_word(&format!("n{}", i))).collect();

        let selected = select_words(&pool, 10, now());
        assert_eq!(words(&selected), vec!["n0", "n1"]);

        let selected = select_words(&pool, 3, now());
        assert_eq!(words(&selected), vec!["n0"]);
    }

    #[test]
    fn test_fill_order_after_due() {
        let pool = vec![
            reviewed("mastered-weak", ItemStatus::Mastered, 0.81, 10),
            reviewed("learning-strong", ItemStatus::Learning, 0.6, 3),
            new_word("fresh"),
            reviewed("due", ItemStatus::Learning, 0.5, -1),
            reviewed("learning-weak", ItemStatus::Learning, 0.2, 2),
            reviewed("mastered-strong", ItemStatus::Mastered, 0.95, 12),
        ];

        let selected = select_words(&pool, 10, now());
        assert_eq!(
            words(&selected),
            vec![
                "due",
                "fresh",
                "learning-weak",
                "learning-strong",
                "mastered-weak",
                "mastered-strong"
            ]
        );

        let selected = select_words(&pool, 4, now());
        assert_eq!(words(&selected), vec!["due", "fresh", "learning-weak", "learning-strong"]);
    }

    #[test]
    fn test_due_items_can_fill_session_alone() {
        let mut pool: Vec<VocabularyItem> = (0..5)
            .map(|i| reviewed(&format!("d{}", i), ItemStatus::Learning, 0.5, -(i as i64) - 1))
            .collect();
        pool.push(new_word("fresh"));

        let selected = select_words(&pool, 5, now());
        assert_eq!(selected.len(), 5);
        assert!(selected.iter().all(|i| i.repetitions > 0));
    }

    #[test]
    fn test_unreviewed_word_with_past_date_is_new() {
        let mut item = new_word("odd");
        item.next_review_at = Some(now() - Duration::days(3));
        let buckets = SessionBuckets::partition(&[item], now());

        assert_eq!(buckets.new_words.len(), 1);
        assert!(buckets.due.is_empty());
    }

    #[test]
    fn test_missing_review_date_is_not_due() {
        let mut item = reviewed("undated", ItemStatus::Learning, 0.4, 0);
        item.next_review_at = None;
        let buckets = SessionBuckets::partition(&[item], now());

        assert!(buckets.due.is_empty());
        assert_eq!(buckets.learning_not_due.len(), 1);
    }

    #[test]
    fn test_due_exactly_now() {
        let item = reviewed("edge", ItemStatus::Mastered, 0.9, 0);
        let buckets = SessionBuckets::partition(&[item], now());
        assert_eq!(buckets.due.len(), 1);
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let pool: Vec<VocabularyItem> = (0..6)
            .map(|i| reviewed(&format!("w{}", i), ItemStatus::Learning, 0.5, -1))
            .collect();
        let params = SessionParams::default();

        let first = build_session(&pool, &params, now(), &mut StdRng::seed_from_u64(42));
        let second = build_session(&pool, &params, now(), &mut StdRng::seed_from_u64(42));

        let order = |s: &[PracticeItem]| -> Vec<(String, ExerciseKind)> {
            s.iter().map(|p| (p.word_data.word.clone(), p.kind)).collect()
        };
        assert_eq!(order(&first), order(&second));
        assert_eq!(first.len(), 12);
    }
}
