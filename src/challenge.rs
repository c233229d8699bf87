//! Hydration challenge progress

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::DailyMetricRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeConfig {
    /// Catalog code of the hydration challenge (default: "WATER7")
    pub code: String,

    /// Display title (default: "7-day hydration")
    pub title: String,

    /// Challenge length in days (default: 7)
    pub duration_days: u32,

    /// Water logged on a day for it to count (default: 1500 mL)
    pub water_threshold_ml: u32,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        ChallengeConfig {
            code: "WATER7".to_string(),
            title: "7-day hydration".to_string(),
            duration_days: 7,
            water_threshold_ml: 1500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeProgress {
    pub code: String,
    pub title: String,
    pub start_date: NaiveDate,

    /// Current day of the challenge, clamped to `1..=duration_days`
    pub day: u32,

    pub duration_days: u32,

    /// Days within the challenge window that met the daily target
    pub progress_days: u32,

    pub target_daily: u32,
    pub unit: String,
}

impl ChallengeProgress {
    pub fn is_complete(&self) -> bool {
        self.progress_days >= self.duration_days
    }
}

#[derive(Debug, Clone, Default)]
pub struct HydrationChallenge {
    config: ChallengeConfig,
}

impl HydrationChallenge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ChallengeConfig) -> Self {
        HydrationChallenge { config }
    }

    /// Last day of a challenge started on `start`
    pub fn end_date(&self, start: NaiveDate) -> NaiveDate {
        let span = u64::from(self.config.duration_days.max(1) - 1);
        start.checked_add_days(Days::new(span)).unwrap_or(start)
    }

    pub fn progress(&self, metrics: &[DailyMetricRecord], start: NaiveDate, today: NaiveDate) -> ChallengeProgress {
        let duration = self.config.duration_days.max(1);
        let end = self.end_date(start);

        let elapsed = (today - start).num_days() + 1;
        let day = elapsed.clamp(1, i64::from(duration)) as u32;

        let progress_days = metrics
            .iter()
            .filter(|m| m.date >= start && m.date <= end)
            .filter(|m| m.water_ml.unwrap_or(0) >= self.config.water_threshold_ml)
            .count() as u32;

        ChallengeProgress {
            code: self.config.code.clone(),
            title: self.config.title.clone(),
            start_date: start,
            day,
            duration_days: duration,
            progress_days,
            target_daily: self.config.water_threshold_ml,
            unit: "ml of water".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn water(date: NaiveDate, ml: Option<u32>) -> DailyMetricRecord {
        DailyMetricRecord {
            water_ml: ml,
            ..DailyMetricRecord::empty(Uuid::nil(), date)
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    #[test]
    fn test_progress_counts_days_over_threshold() {
        let metrics = vec![
            water(day(1), Some(1500)),
            water(day(2), Some(1499)),
            water(day(3), None),
            water(day(4), Some(2200)),
            water(day(8), Some(3000)),
            water(day(9), Some(3000)),
        ];

        let progress = HydrationChallenge::new().progress(&metrics, day(2), day(4));
        assert_eq!(progress.day, 3);
        assert_eq!(progress.progress_days, 2);
        assert_eq!(progress.target_daily, 1500);
        assert_eq!(progress.code, "WATER7");
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_day_is_clamped() {
        let challenge = HydrationChallenge::new();
        assert_eq!(challenge.progress(&[], day(10), day(5)).day, 1);
        assert_eq!(challenge.progress(&[], day(1), day(30)).day, 7);
        assert_eq!(challenge.end_date(day(1)), day(7));
    }

    #[test]
    fn test_completed_challenge() {
        let metrics: Vec<DailyMetricRecord> = (1..=7).map(|d| water(day(d), Some(2000))).collect();
        let progress = HydrationChallenge::new().progress(&metrics, day(1), day(7));
        assert_eq!(progress.progress_days, 7);
        assert!(progress.is_complete());
    }
}
