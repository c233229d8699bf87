use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of an already-authenticated user
pub type UserId = Uuid;

/// Identifier of a habit in the user's catalog
pub type HabitId = i64;

/// Habit categories used for plan grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitCategory {
    Nutrition,
    Movement,
    Hydration,
    Lifestyle,
    /// Any category outside the four known ones; never planned
    #[serde(other)]
    Other,
}

impl std::fmt::Display for HabitCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HabitCategory::Nutrition => write!(f, "nutrition"),
            HabitCategory::Movement => write!(f, "movement"),
            HabitCategory::Hydration => write!(f, "hydration"),
            HabitCategory::Lifestyle => write!(f, "lifestyle"),
            HabitCategory::Other => write!(f, "other"),
        }
    }
}

/// A habit owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitDefinition {
    /// Catalog identifier
    pub id: HabitId,

    /// Display name
    pub name: String,

    /// Icon shown next to the habit (usually an emoji)
    pub icon: String,

    /// Category driving plan grouping
    pub category: HabitCategory,

    /// Difficulty from 1 (easy) to 3 (hard)
    pub difficulty: u8,
}

/// One habit completion value for one day
///
/// Unique per (user, habit, date); the last upsert wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinRecord {
    pub user_id: UserId,
    pub habit_id: HabitId,
    pub date: NaiveDate,
    pub done: bool,
}

/// A body-weight reading, at most one per day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeighInRecord {
    pub user_id: UserId,
    pub date: NaiveDate,

    /// Body mass in kilograms
    pub kg: Decimal,
}

/// Nutrition and activity metrics logged for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetricRecord {
    pub user_id: UserId,
    pub date: NaiveDate,

    /// Step count
    #[serde(default)]
    pub steps: u32,

    /// Hours slept the previous night
    #[serde(default)]
    pub sleep_hours: Option<f64>,

    /// Protein eaten in grams
    #[serde(default)]
    pub protein_g: Option<u32>,

    /// Fiber eaten in grams
    #[serde(default)]
    pub fiber_g: Option<u32>,

    /// Water drunk in millilitres
    #[serde(default)]
    pub water_ml: Option<u32>,

    /// Strength training minutes
    #[serde(default)]
    pub strength_min: u32,

    /// Cardio minutes
    #[serde(default)]
    pub cardio_min: u32,

    /// Self-reported mood score
    #[serde(default)]
    pub mood: Option<u8>,

    /// Self-reported hunger score
    #[serde(default)]
    pub hunger: Option<u8>,

    #[serde(default)]
    pub notes: Option<String>,
}

impl DailyMetricRecord {
    /// Empty metrics row for a day with nothing logged
    pub fn empty(user_id: UserId, date: NaiveDate) -> Self {
        DailyMetricRecord {
            user_id,
            date,
            steps: 0,
            sleep_hours: None,
            protein_g: None,
            fiber_g: None,
            water_ml: None,
            strength_min: 0,
            cardio_min: 0,
            mood: None,
            hunger: None,
            notes: None,
        }
    }
}

/// Extra context attached to an XP ledger entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpMetadata {
    /// Habit that triggered the award, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub habit_id: Option<HabitId>,
}

/// Append-only experience point ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpEvent {
    pub user_id: UserId,

    /// Reason tag such as `habit_done` or `daily_complete`
    pub reason: String,

    /// Signed amount; negative amounts are allowed by the ledger format
    pub amount: i64,

    #[serde(default)]
    pub metadata: Option<XpMetadata>,
}

impl XpEvent {
    pub const HABIT_DONE: &'static str = "habit_done";
    pub const DAILY_COMPLETE: &'static str = "daily_complete";
}

/// Biological sex used by the BMR formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl std::str::FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            _ => Err(format!("Invalid sex: {}", s)),
        }
    }
}

/// Profile fields used for nutrition defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub sex: Option<Sex>,

    #[serde(default)]
    pub birth_year: Option<i32>,

    /// Height in centimeters
    #[serde(default)]
    pub height_cm: Option<f64>,

    /// Declared weight in kilograms (weigh-ins take precedence)
    #[serde(default)]
    pub weight_kg: Option<f64>,

    /// TDEE multiplier, 1.2 to 1.9
    #[serde(default)]
    pub activity_factor: Option<f64>,

    /// Calorie deficit as a fraction, 0.0 to 0.2
    #[serde(default)]
    pub deficit_percent: Option<f64>,
}

impl UserProfile {
    /// Age in whole years during the calendar year of `on`
    pub fn age_on(&self, on: NaiveDate) -> Option<u32> {
        self.birth_year
            .and_then(|year| u32::try_from(on.year() - year).ok())
    }
}
