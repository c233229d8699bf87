// Library interface for the coachrs decision engine
// The CLI and integration tests go through these modules

pub mod challenge;
pub mod coach;
pub mod config;
pub mod energy;
pub mod engine;
pub mod error;
pub mod garden;
pub mod leveling;
pub mod logging;
pub mod models;
pub mod nutrition;
pub mod plan;
pub mod plateau;
pub mod review;
pub mod snapshot;
pub mod streak;
pub mod trend;

// Re-export commonly used types for convenience
pub use models::*;
pub use config::CoachConfig;
pub use engine::{CheckinOutcome, CoachEngine, StreakSummary};
pub use energy::{EnergyClassifier, EnergyTier};
pub use garden::{GardenState, GrowthStage};
pub use leveling::{LevelStatus, LevelingEngine};
pub use nutrition::{DailyTargets, NutritionEstimator};
pub use plateau::PlateauDetector;
pub use snapshot::UserSnapshot;
pub use streak::StreakCalculator;
pub use trend::TrendSmoother;
pub use error::{CoachError, ErrorSeverity, Result, SnapshotError};
pub use logging::{LogConfig, LogFormat, LogLevel};
