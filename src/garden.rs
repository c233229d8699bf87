//! Garden metaphor for the perfect-day streak
//!
//! The plant's stage is a pure function of the hard streak:
//!
//! | Streak | Stage  |
//! |--------|--------|
//! | 0-2    | seed   |
//! | 3-4    | sprout |
//! | 5-6    | leafy  |
//! | 7+     | flower |
//!
//! Nothing is remembered between queries; the state is rebuilt from the
//! streak and today's/yesterday's completeness each time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::streak::{DailyDoneCounts, StreakCalculator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthStage {
    Seed,
    Sprout,
    Leafy,
    Flower,
}

impl GrowthStage {
    pub fn from_streak(streak: u32) -> Self {
        match streak {
            0..=2 => GrowthStage::Seed,
            3..=4 => GrowthStage::Sprout,
            5..=6 => GrowthStage::Leafy,
            _ => GrowthStage::Flower,
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            GrowthStage::Seed => "Complete your 3 habits to make the seed sprout!",
            GrowthStage::Sprout => "Keep it up to see new leaves grow.",
            GrowthStage::Leafy => "Your plant is growing fast, aim for the bloom!",
            GrowthStage::Flower => "Gorgeous flower! Keep the streak alive to keep it.",
        }
    }
}

impl std::fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrowthStage::Seed => write!(f, "seed"),
            GrowthStage::Sprout => write!(f, "sprout"),
            GrowthStage::Leafy => write!(f, "leafy"),
            GrowthStage::Flower => write!(f, "flower"),
        }
    }
}

/// Garden view of the user's progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GardenState {
    /// Today already counts as a perfect day
    pub watered_today: bool,

    /// Current hard streak
    pub perfect_streak: u32,

    pub stage: GrowthStage,

    /// Streak is 0 and yesterday was not perfect either
    pub droopy: bool,

    pub hint: String,
}

impl GardenState {
    pub fn derive(perfect_streak: u32, watered_today: bool, yesterday_perfect: bool) -> Self {
        let stage = GrowthStage::from_streak(perfect_streak);
        GardenState {
            watered_today,
            perfect_streak,
            stage,
            droopy: perfect_streak == 0 && !yesterday_perfect,
            hint: stage.hint().to_string(),
        }
    }

    /// Build the state straight from daily done counts
    pub fn from_counts(calculator: &StreakCalculator, counts: &DailyDoneCounts, today: NaiveDate) -> Self {
        let streak = calculator.hard_streak(counts, today);
        let watered = calculator.is_perfect_day(counts, today);
        let yesterday_perfect = today
            .pred_opt()
            .map(|yesterday| calculator.is_perfect_day(counts, yesterday))
            .unwrap_or(false);

        Self::derive(streak, watered, yesterday_perfect)
    }
}
