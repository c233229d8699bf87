//! Consecutive-day streaks over habit check-ins
//!
//! Two streak flavours are tracked:
//!
//! - **Hard streak**: consecutive "perfect" days (at least 3 habits done),
//!   computed as the trailing run of a per-day completeness series built
//!   over the whole lookback window.
//! - **Soft streak**: walking backward from today, consecutive days with at
//!   least 2 habits done.
//!
//! A calendar day without any check-in row counts as zero completions.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::CheckinRecord;

/// Streak thresholds and window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakConfig {
    /// Days looked back from today (default: 30)
    pub lookback_days: u32,

    /// Done check-ins needed for a perfect day (default: 3)
    pub perfect_day_threshold: u32,

    /// Done check-ins needed for a soft-streak day (default: 2)
    pub soft_threshold: u32,
}

impl Default for StreakConfig {
    fn default() -> Self {
        StreakConfig {
            lookback_days: 30,
            perfect_day_threshold: 3,
            soft_threshold: 2,
        }
    }
}

/// Done check-in counts keyed by calendar day
pub type DailyDoneCounts = BTreeMap<NaiveDate, u32>;

/// Streak computations over daily done counts
#[derive(Debug, Clone, Default)]
pub struct StreakCalculator {
    config: StreakConfig,
}

impl StreakCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StreakConfig) -> Self {
        StreakCalculator { config }
    }

    pub fn config(&self) -> &StreakConfig {
        &self.config
    }

    /// Count done check-ins per day
    ///
    /// Days that only have not-done rows are present with a count of 0.
    pub fn aggregate_daily_done(checkins: &[CheckinRecord]) -> DailyDoneCounts {
        let mut counts = DailyDoneCounts::new();
        for checkin in checkins {
            *counts.entry(checkin.date).or_insert(0) += u32::from(checkin.done);
        }
        counts
    }

    fn done_on(counts: &DailyDoneCounts, day: NaiveDate) -> u32 {
        counts.get(&day).copied().unwrap_or(0)
    }

    /// Whether `day` reaches the perfect-day threshold
    pub fn is_perfect_day(&self, counts: &DailyDoneCounts, day: NaiveDate) -> bool {
        Self::done_on(counts, day) >= self.config.perfect_day_threshold
    }

    /// Completeness flag for every day from `today - lookback` to `today`
    pub fn completeness_series(&self, counts: &DailyDoneCounts, today: NaiveDate) -> Vec<(NaiveDate, bool)> {
        let start = today
            .checked_sub_days(Days::new(u64::from(self.config.lookback_days)))
            .unwrap_or(today);

        start
            .iter_days()
            .take_while(|day| *day <= today)
            .map(|day| (day, self.is_perfect_day(counts, day)))
            .collect()
    }

    /// Length of the run of perfect days ending today; 0 if today is not perfect
    pub fn hard_streak(&self, counts: &DailyDoneCounts, today: NaiveDate) -> u32 {
        self.completeness_series(counts, today)
            .iter()
            .rev()
            .take_while(|(_, complete)| *complete)
            .count() as u32
    }

    /// Consecutive days back from today meeting the soft threshold
    pub fn soft_streak(&self, counts: &DailyDoneCounts, today: NaiveDate) -> u32 {
        let mut streak = 0;
        let mut day = today;

        for _ in 0..self.config.lookback_days {
            if Self::done_on(counts, day) < self.config.soft_threshold {
                break;
            }
            streak += 1;
            day = match day.pred_opt() {
                Some(previous) => previous,
                None => break,
            };
        }

        streak
    }
}
