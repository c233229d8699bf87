//! Experience points and the triangular leveling curve
//!
//! Level `L` starts at `100 * L * (L - 1) / 2` XP, so each level costs 100 XP
//! more than the previous one: 0, 100, 300, 600, 1000, ...

use serde::{Deserialize, Serialize};

use crate::models::{HabitId, UserId, XpEvent, XpMetadata};

/// XP award amounts and level names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpConfig {
    /// Awarded when a habit is newly marked done (default: 10)
    pub habit_done: i64,

    /// Awarded when a day reaches the completion threshold (default: 25)
    pub daily_complete: i64,

    /// Done check-ins in a day needed for the daily bonus (default: 3)
    pub daily_complete_threshold: u32,

    /// Display names by level; levels past the end keep the last name
    pub level_names: Vec<String>,
}

impl Default for XpConfig {
    fn default() -> Self {
        XpConfig {
            habit_done: 10,
            daily_complete: 25,
            daily_complete_threshold: 3,
            level_names: ["Novice", "Consistent", "Momentum", "Transformer", "Athlete"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

/// Position of an XP total on the curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    /// Level, starting at 1
    pub level: u32,

    /// XP at which the current level starts
    pub current_threshold: i64,

    /// XP at which the next level starts
    pub next_threshold: i64,
}

/// Gamification summary for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelStatus {
    pub total_xp: i64,
    pub level: u32,
    pub level_name: String,
    pub next_level_xp: i64,

    /// Progress through the current level in [0, 1], rounded to 3 decimals
    pub progress: f64,
}

/// XP needed to reach `level`, saturating at `i64::MAX`
pub fn xp_threshold(level: u32) -> i64 {
    let level = i64::from(level);
    50i64.saturating_mul(level).saturating_mul((level - 1).max(0))
}

/// Largest level whose threshold is reached; negative totals stay at level 1
pub fn level_from_xp(xp: i64) -> LevelInfo {
    let xp = xp.max(0);

    // Invert 50·L·(L−1) = xp, then correct for float error
    let estimate = (1.0 + (1.0 + xp as f64 / 12.5).sqrt()) / 2.0;
    let mut level = (estimate.floor() as u32).max(1);
    while level > 1 && xp_threshold(level) > xp {
        level -= 1;
    }
    while xp_threshold(level.saturating_add(1)) <= xp
        && xp_threshold(level.saturating_add(1)) > xp_threshold(level)
    {
        level += 1;
    }

    LevelInfo {
        level,
        current_threshold: xp_threshold(level),
        next_threshold: xp_threshold(level + 1),
    }
}

/// Fraction of the way from the current to the next threshold
pub fn level_progress(xp: i64, info: &LevelInfo) -> f64 {
    let span = info.next_threshold - info.current_threshold;
    if span <= 0 {
        return 0.0;
    }
    let earned = (xp.max(0) - info.current_threshold) as f64;
    (earned / span as f64).clamp(0.0, 1.0)
}

/// Sum of the ledger, saturating instead of overflowing
pub fn total_xp(events: &[XpEvent]) -> i64 {
    events
        .iter()
        .fold(0i64, |total, event| total.saturating_add(event.amount))
}

/// Leveling and XP award rules
#[derive(Debug, Clone, Default)]
pub struct LevelingEngine {
    config: XpConfig,
}

impl LevelingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: XpConfig) -> Self {
        LevelingEngine { config }
    }

    pub fn level_name(&self, level: u32) -> String {
        let index = (level.max(1) - 1) as usize;
        self.config
            .level_names
            .get(index)
            .or_else(|| self.config.level_names.last())
            .cloned()
            .unwrap_or_else(|| format!("Level {}", level))
    }

    pub fn status(&self, events: &[XpEvent]) -> LevelStatus {
        let total = total_xp(events);
        let info = level_from_xp(total);
        let progress = (level_progress(total, &info) * 1000.0).round() / 1000.0;

        LevelStatus {
            total_xp: total,
            level: info.level,
            level_name: self.level_name(info.level),
            next_level_xp: info.next_threshold,
            progress,
        }
    }

    /// Ledger entries earned by a check-in upsert
    ///
    /// Only a not-done to done transition earns XP. `done_today` is the number
    /// of done check-ins today after the upsert.
    pub fn awards_for_checkin(
        &self,
        user_id: UserId,
        habit_id: HabitId,
        previously_done: bool,
        done: bool,
        done_today: u32,
    ) -> Vec<XpEvent> {
        if !done || previously_done {
            return Vec::new();
        }

        let mut awards = vec![XpEvent {
            user_id,
            reason: XpEvent::HABIT_DONE.to_string(),
            amount: self.config.habit_done,
            metadata: Some(XpMetadata {
                habit_id: Some(habit_id),
            }),
        }];

        if done_today >= self.config.daily_complete_threshold {
            awards.push(XpEvent {
                user_id,
                reason: XpEvent::DAILY_COMPLETE.to_string(),
                amount: self.config.daily_complete,
                metadata: None,
            });
        }

        awards
    }
}
