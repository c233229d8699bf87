//! Error hierarchy for coachrs
//!
//! Engine computations never fail; errors only come from loading and
//! validating the caller-supplied history and from configuration handling.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{HabitId, UserId};

/// Top-level error type for all coachrs operations
#[derive(Debug, Error)]
pub enum CoachError {
    /// Invalid caller input outside a snapshot (CLI arguments, profile fields)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding of a snapshot
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Snapshot violates an input contract
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Input contract violations of a user snapshot
#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    /// Snapshot file does not exist
    #[error("Snapshot not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Weigh-ins must be strictly ascending by date
    #[error("Weigh-ins out of order: {previous} is followed by {next}")]
    UnsortedWeighIns { previous: NaiveDate, next: NaiveDate },

    /// Body mass must be positive
    #[error("Invalid weigh-in on {date}: {kg} kg")]
    NonPositiveWeight { date: NaiveDate, kg: String },

    /// Habit difficulty outside 1..=3
    #[error("Habit {habit_id} has difficulty {difficulty}, expected 1-3")]
    InvalidDifficulty { habit_id: HabitId, difficulty: u8 },

    /// At most one check-in per (habit, date)
    #[error("Duplicate check-in for habit {habit_id} on {date}")]
    DuplicateCheckin { habit_id: HabitId, date: NaiveDate },

    /// At most one metrics row per date
    #[error("Duplicate metrics row on {date}")]
    DuplicateMetrics { date: NaiveDate },

    /// A record belongs to another user
    #[error("Record in {collection} belongs to {found}, expected {expected}")]
    ForeignRecord {
        collection: String,
        expected: UserId,
        found: UserId,
    },
}

/// Result type alias for coachrs operations
pub type Result<T> = std::result::Result<T, CoachError>;

impl CoachError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoachError::Validation(_) => ErrorSeverity::Warning,
            CoachError::Snapshot(SnapshotError::FileNotFound { .. }) => ErrorSeverity::Warning,
            CoachError::Snapshot(_) => ErrorSeverity::Error,
            CoachError::Configuration(_) => ErrorSeverity::Error,
            CoachError::Io(_) => ErrorSeverity::Error,
            CoachError::Serialization(_) => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            CoachError::Snapshot(SnapshotError::FileNotFound { path }) => {
                format!("Could not find history file: {}", path.display())
            }
            CoachError::Snapshot(SnapshotError::UnsortedWeighIns { .. }) => {
                "Weigh-ins must be listed oldest first, one per day.".to_string()
            }
            CoachError::Serialization(err) => {
                format!("History file is not valid JSON: {}", err)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
    /// Informational message
    Info,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Info => tracing::Level::INFO,
        }
    }
}
