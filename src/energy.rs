use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::CheckinRecord;

/// Coarse adherence level driving plan difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyTier {
    Low,
    Medium,
    High,
}

impl EnergyTier {
    /// Hardest habit difficulty allowed in today's plan
    pub fn difficulty_cap(&self) -> u8 {
        match self {
            EnergyTier::Low => 1,
            EnergyTier::Medium => 2,
            EnergyTier::High => 3,
        }
    }

    /// Encouragement shown alongside the daily plan
    pub fn plan_message(&self) -> &'static str {
        match self {
            EnergyTier::Low => "Low energy: micro-steps today. Every check counts 💪",
            EnergyTier::Medium => "Consistency is progress. 3 simple actions and we celebrate 🎉",
            EnergyTier::High => "You're on fire 🚀 Let's go one notch higher!",
        }
    }
}

impl std::fmt::Display for EnergyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnergyTier::Low => write!(f, "low"),
            EnergyTier::Medium => write!(f, "medium"),
            EnergyTier::High => write!(f, "high"),
        }
    }
}

/// Thresholds for the energy classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyConfig {
    /// Completion ratio at or above which energy is high (default: 0.8)
    pub high_threshold: f64,

    /// Completion ratio at or above which energy is medium (default: 0.4)
    pub medium_threshold: f64,

    /// Trailing window for the completion ratio, today included (default: 7)
    pub window_days: u32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        EnergyConfig {
            high_threshold: 0.8,
            medium_threshold: 0.4,
            window_days: 7,
        }
    }
}

/// Maps recent adherence to an energy tier
#[derive(Debug, Clone, Default)]
pub struct EnergyClassifier {
    config: EnergyConfig,
}

impl EnergyClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EnergyConfig) -> Self {
        EnergyClassifier { config }
    }

    pub fn classify(&self, completion_ratio: f64) -> EnergyTier {
        if completion_ratio >= self.config.high_threshold {
            EnergyTier::High
        } else if completion_ratio >= self.config.medium_threshold {
            EnergyTier::Medium
        } else {
            EnergyTier::Low
        }
    }

    /// Share of check-in rows marked done in the trailing window
    ///
    /// Rows dated after `today` are ignored. Returns 0.0 when the window has
    /// no rows at all.
    pub fn completion_ratio(&self, checkins: &[CheckinRecord], today: NaiveDate) -> f64 {
        let span = u64::from(self.config.window_days.saturating_sub(1));
        let start = today.checked_sub_days(Days::new(span)).unwrap_or(today);

        let (done, total) = checkins
            .iter()
            .filter(|c| c.date >= start && c.date <= today)
            .fold((0usize, 0usize), |(done, total), c| {
                (done + usize::from(c.done), total + 1)
            });

        if total == 0 {
            return 0.0;
        }
        done as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn checkin(habit_id: i64, date: NaiveDate, done: bool) -> CheckinRecord {
        CheckinRecord {
            user_id: Uuid::nil(),
            habit_id,
            date,
            done,
        }
    }

    #[test]
    fn test_classifier_boundaries() {
        let classifier = EnergyClassifier::new();
        assert_eq!(classifier.classify(0.8), EnergyTier::High);
        assert_eq!(classifier.classify(0.79999), EnergyTier::Medium);
        assert_eq!(classifier.classify(0.4), EnergyTier::Medium);
        assert_eq!(classifier.classify(0.39999), EnergyTier::Low);
        assert_eq!(classifier.classify(0.0), EnergyTier::Low);
        assert_eq!(classifier.classify(1.0), EnergyTier::High);
    }

    #[test]
    fn test_difficulty_caps() {
        assert_eq!(EnergyTier::Low.difficulty_cap(), 1);
        assert_eq!(EnergyTier::Medium.difficulty_cap(), 2);
        assert_eq!(EnergyTier::High.difficulty_cap(), 3);
    }

    #[test]
    fn test_completion_ratio_window() {
        let today = NaiveDate::from_ymd_opt(2024, 9, 23).unwrap();
        let classifier = EnergyClassifier::new();
        let checkins = vec![
            checkin(1, today, true),
            checkin(2, today, false),
            checkin(1, today - Days::new(6), true),
            checkin(2, today - Days::new(6), true),
            // Outside the 7-day window
            checkin(1, today - Days::new(7), false),
            checkin(2, today - Days::new(8), false),
        ];

        assert!((classifier.completion_ratio(&checkins, today) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_completion_ratio_without_rows() {
        let today = NaiveDate::from_ymd_opt(2024, 9, 23).unwrap();
        assert_eq!(EnergyClassifier::new().completion_ratio(&[], today), 0.0);
    }

    #[test]
    fn test_tier_serialization() {
        assert_eq!(serde_json::to_string(&EnergyTier::Medium).unwrap(), "\"medium\"");
        assert_eq!(EnergyTier::High.to_string(), "high");
    }

    proptest! {
        #[test]
        fn test_classifier_is_monotonic(a in 0.0f64..=1.0f64, b in 0.0f64..=1.0f64) {
            let classifier = EnergyClassifier::new();
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(classifier.classify(low) <= classifier.classify(high));
        }
    }
}
