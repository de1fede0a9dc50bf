//! Vocabulary review engine
//!
//! This module provides:
//! - Vocabulary records and their mastery status
//! - The review scheduler (accuracy EWMA, status transitions, next review date)
//! - Session assembly from the learner's full vocabulary
//! - The practice session state machine
//! - File-backed storage

pub mod clock;
pub mod models;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use models::*;
pub use runtime::{AdvanceEvent, GuessRating, PracticeSession, ReviewFeedback, SessionError, SessionSummary};
pub use scheduler::{compute_review, ReviewOutcome, Scheduler};
pub use session::{build_session, select_words, SessionParams};
pub use storage::{ItemUpdater, StorageError, VocabularyStorage};
