//! Practice session state machine
//!
//! ```text
//! Idle --present--> Answering --submit--> Feedback --finish_feedback--> Continue --advance--> Idle | Finished
//! ```
//!
//! An exercise leaves the rotation once its word's accuracy reaches 0.7.
//! Anything weaker stays and comes back later in the same session.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::{ExerciseKind, ItemStatus, PracticeItem, VocabularyItem};
use super::scheduler::Scheduler;

/// Accuracy at which an exercise counts as done for this session
pub const SESSION_DONE_ACCURACY: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum Phase {
    /// Card chosen, not yet shown
    Idle,
    /// Card shown, waiting for the learner
    Answering,
    /// Answer graded; accuracy on display
    Feedback { accuracy: f64 },
    /// Updated word on display until the learner moves on
    Continue,
    Finished,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("An answer is still being processed")]
    Busy,

    #[error("Cannot {action} during {phase:?}")]
    WrongPhase { action: &'static str, phase: Phase },

    #[error("No exercise to practice")]
    NoCurrentItem,

    #[error("Current exercise is not a {expected:?} exercise")]
    WrongExercise { expected: ExerciseKind },
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Self-graded recall on a guess card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GuessRating {
    Forgot,
    Partial,
    Knew,
}

impl GuessRating {
    pub fn quality(self) -> i32 {
        match self {
            Self::Forgot => 1,
            Self::Partial => 3,
            Self::Knew => 5,
        }
    }
}

fn normalize_answer(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// 5 when the typed answer matches the word (ignoring case and spacing), 1 otherwise
pub fn grade_written_answer(typed: &str, target: &str) -> i32 {
    if normalize_answer(typed) == normalize_answer(target) {
        5
    } else {
        1
    }
}

/// What the learner sees right after answering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewFeedback {
    pub quality: i32,
    pub accuracy: f64,
    pub status: ItemStatus,
    pub next_review_at: DateTime<Utc>,
    pub interval_days: i64,
    pub done: bool,
}

/// Outcome of moving past the current card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceEvent {
    /// A different card is up next
    Next,
    /// The same card is up again; the UI should reset its state
    RetrySameCard,
    Finished,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub total_count: usize,
    pub completed_count: usize,
    pub answers: u32,
    pub first_try_count: usize,
    pub finished: bool,
}

pub struct PracticeSession {
    scheduler: Arc<Scheduler>,
    active: Vec<PracticeItem>,
    done: Vec<PracticeItem>,
    current: usize,
    phase: Phase,
    processing: bool,
    total_count: usize,
    completed_count: usize,
    answers: u32,
    first_try_count: usize,
}

impl PracticeSession {
    pub fn new(items: Vec<PracticeItem>, scheduler: Arc<Scheduler>) -> Self {
        let total_count = items.len();
        let phase = if items.is_empty() { Phase::Finished } else { Phase::Idle };
        log::info!("Starting practice session with {} exercises", total_count);

        Self {
            scheduler,
            active: items,
            done: Vec::new(),
            current: 0,
            phase,
            processing: false,
            total_count,
            completed_count: 0,
            answers: 0,
            first_try_count: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn completed_count(&self) -> usize {
        self.completed_count
    }

    /// Exercises still in rotation
    pub fn remaining(&self) -> usize {
        self.active.len()
    }

    /// Exercises retired so far, in the order they were completed
    pub fn completed_items(&self) -> &[PracticeItem] {
        &self.done
    }

    pub fn current(&self) -> Option<&PracticeItem> {
        if self.is_finished() {
            return None;
        }
        self.active.get(self.current)
    }

    /// Show the current card and start waiting for an answer
    pub fn present(&mut self) -> Result<&PracticeItem> {
        match self.phase {
            Phase::Idle | Phase::Answering => {}
            phase => return Err(SessionError::WrongPhase { action: "present a card", phase }),
        }
        let now = self.scheduler.now();
        let item = self.active.get_mut(self.current).ok_or(SessionError::NoCurrentItem)?;
        item.last_shown_at = Some(now);
        self.phase = Phase::Answering;
        Ok(item)
    }

    pub fn submit_guess(&mut self, rating: GuessRating) -> Result<ReviewFeedback> {
        self.expect_kind(ExerciseKind::Guess)?;
        self.submit_quality(rating.quality())
    }

    pub fn submit_written(&mut self, typed: &str) -> Result<ReviewFeedback> {
        self.expect_kind(ExerciseKind::Write)?;
        let target = self.active[self.current].word_data.word.clone();
        self.submit_quality(grade_written_answer(typed, &target))
    }

    fn expect_kind(&self, expected: ExerciseKind) -> Result<()> {
        let item = self.current().ok_or(SessionError::NoCurrentItem)?;
        if item.kind != expected {
            return Err(SessionError::WrongExercise { expected });
        }
        Ok(())
    }

    /// Grade the current card. Input is refused until [`finish_feedback`](Self::finish_feedback).
    pub fn submit_quality(&mut self, quality: i32) -> Result<ReviewFeedback> {
        if self.processing {
            return Err(SessionError::Busy);
        }
        if self.phase != Phase::Answering {
            return Err(SessionError::WrongPhase { action: "submit an answer", phase: self.phase });
        }
        let index = self.current;
        let word = self
            .active
            .get(index)
            .map(|item| item.word_data.clone())
            .ok_or(SessionError::NoCurrentItem)?;

        self.processing = true;
        let outcome = self.scheduler.review(&word, quality, &[]);
        let now = outcome.patch.last_reviewed_at;

        let item = &mut self.active[index];
        item.word_data = outcome.item.clone();
        item.record_answer(quality, now);

        for (i, other) in self.active.iter_mut().enumerate() {
            if i != index && other.word_data.id == word.id {
                other.word_data = outcome.item.clone();
            }
        }

        self.answers += 1;
        self.phase = Phase::Feedback { accuracy: outcome.item.accuracy };

        Ok(ReviewFeedback {
            quality,
            accuracy: outcome.item.accuracy,
            status: outcome.item.status(),
            next_review_at: outcome.patch.next_review_at,
            interval_days: outcome.interval_days(),
            done: outcome.item.accuracy >= SESSION_DONE_ACCURACY,
        })
    }

    /// End the feedback pause; the updated word stays on screen
    pub fn finish_feedback(&mut self) -> Result<&VocabularyItem> {
        match self.phase {
            Phase::Feedback { .. } => {}
            phase => return Err(SessionError::WrongPhase { action: "finish feedback", phase }),
        }
        self.processing = false;
        self.phase = Phase::Continue;
        self.active
            .get(self.current)
            .map(|item| &item.word_data)
            .ok_or(SessionError::NoCurrentItem)
    }

    /// Move past the current card, retiring it if its word is strong enough
    pub fn advance(&mut self) -> Result<AdvanceEvent> {
        if self.phase != Phase::Continue {
            return Err(SessionError::WrongPhase { action: "advance", phase: self.phase });
        }
        let index = self.current;
        let done = self
            .active
            .get(index)
            .map(|item| item.word_data.accuracy >= SESSION_DONE_ACCURACY)
            .ok_or(SessionError::NoCurrentItem)?;

        if done {
            let mut item = self.active.remove(index);
            item.completed = true;
            if item.session_attempts == 1 {
                self.first_try_count += 1;
            }
            self.done.push(item);
            self.completed_count += 1;
        }

        if self.completed_count >= self.total_count || self.active.is_empty() {
            self.phase = Phase::Finished;
            log::info!(
                "Practice session finished: {}/{} exercises in {} answers",
                self.completed_count,
                self.total_count,
                self.answers
            );
            return Ok(AdvanceEvent::Finished);
        }

        self.phase = Phase::Idle;

        if done {
            self.current = index % self.active.len();
            return Ok(AdvanceEvent::Next);
        }

        let next = (index + 1) % self.active.len();
        if next == index {
            Ok(AdvanceEvent::RetrySameCard)
        } else {
            self.current = next;
            Ok(AdvanceEvent::Next)
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            total_count: self.total_count,
            completed_count: self.completed_count,
            answers: self.answers,
            first_try_count: self.first_try_count,
            finished: self.is_finished(),
        }
    }

    /// Abandon the session. Answers already submitted stay persisted.
    pub fn quit(self) -> SessionSummary {
        let summary = self.summary();
        if !summary.finished {
            log::info!(
                "Practice session abandoned with {} exercises left",
                self.active.len()
            );
        }
        summary
    }
}
