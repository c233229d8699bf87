//! Caller-supplied history for one user
//!
//! The engine never reads storage. The calling layer gathers a consistent
//! view of one user's records into a [`UserSnapshot`], and everything the
//! engine computes is derived from it.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SnapshotError};
use crate::models::{
    CheckinRecord, DailyMetricRecord, HabitDefinition, HabitId, UserId, UserProfile, WeighInRecord,
    XpEvent,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub user_id: UserId,

    #[serde(default)]
    pub profile: UserProfile,

    #[serde(default)]
    pub habits: Vec<HabitDefinition>,

    #[serde(default)]
    pub checkins: Vec<CheckinRecord>,

    /// Ascending by date, one per day
    #[serde(default)]
    pub weigh_ins: Vec<WeighInRecord>,

    #[serde(default)]
    pub metrics: Vec<DailyMetricRecord>,

    /// XP ledger, append-only
    #[serde(default)]
    pub xp_events: Vec<XpEvent>,
}

impl UserSnapshot {
    pub fn new(user_id: UserId) -> Self {
        UserSnapshot {
            user_id,
            profile: UserProfile::default(),
            habits: Vec::new(),
            checkins: Vec::new(),
            weigh_ins: Vec::new(),
            metrics: Vec::new(),
            xp_events: Vec::new(),
        }
    }

    /// Parse a JSON snapshot; weigh-ins are put in date order before validation
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut snapshot: UserSnapshot = serde_json::from_str(json)?;
        snapshot.weigh_ins.sort_by_key(|w| w.date);
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SnapshotError::FileNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let content = fs::read_to_string(path)?;
        let snapshot = Self::from_json_str(&content)?;

        tracing::debug!(
            path = %path.display(),
            habits = snapshot.habits.len(),
            checkins = snapshot.checkins.len(),
            weigh_ins = snapshot.weigh_ins.len(),
            metrics = snapshot.metrics.len(),
            "Loaded snapshot"
        );

        Ok(snapshot)
    }

    /// Check the input contracts the engine relies on
    pub fn validate(&self) -> std::result::Result<(), SnapshotError> {
        for pair in self.weigh_ins.windows(2) {
            if pair[0].date >= pair[1].date {
                return Err(SnapshotError::UnsortedWeighIns {
                    previous: pair[0].date,
                    next: pair[1].date,
                });
            }
        }

        if let Some(w) = self.weigh_ins.iter().find(|w| w.kg <= Decimal::ZERO) {
            return Err(SnapshotError::NonPositiveWeight {
                date: w.date,
                kg: w.kg.to_string(),
            });
        }

        if let Some(h) = self.habits.iter().find(|h| !(1..=3).contains(&h.difficulty)) {
            return Err(SnapshotError::InvalidDifficulty {
                habit_id: h.id,
                difficulty: h.difficulty,
            });
        }

        let mut seen = HashSet::new();
        for c in &self.checkins {
            if !seen.insert((c.habit_id, c.date)) {
                return Err(SnapshotError::DuplicateCheckin {
                    habit_id: c.habit_id,
                    date: c.date,
                });
            }
        }

        let mut days = HashSet::new();
        for m in &self.metrics {
            if !days.insert(m.date) {
                return Err(SnapshotError::DuplicateMetrics { date: m.date });
            }
        }

        self.check_owner("checkins", self.checkins.iter().map(|c| c.user_id))?;
        self.check_owner("weigh_ins", self.weigh_ins.iter().map(|w| w.user_id))?;
        self.check_owner("metrics", self.metrics.iter().map(|m| m.user_id))?;
        self.check_owner("xp_events", self.xp_events.iter().map(|e| e.user_id))?;

        Ok(())
    }

    fn check_owner(
        &self,
        collection: &str,
        mut owners: impl Iterator<Item = UserId>,
    ) -> std::result::Result<(), SnapshotError> {
        match owners.find(|owner| *owner != self.user_id) {
            Some(found) => Err(SnapshotError::ForeignRecord {
                collection: collection.to_string(),
                expected: self.user_id,
                found,
            }),
            None => Ok(()),
        }
    }

    /// Most recent logged weigh-in
    pub fn latest_weight_kg(&self) -> Option<f64> {
        self.weigh_ins.last().and_then(|w| w.kg.to_f64())
    }

    pub fn metrics_on(&self, date: NaiveDate) -> Option<&DailyMetricRecord> {
        self.metrics.iter().find(|m| m.date == date)
    }

    pub fn checkin(&self, habit_id: HabitId, date: NaiveDate) -> Option<&CheckinRecord> {
        self.checkins
            .iter()
            .find(|c| c.habit_id == habit_id && c.date == date)
    }

    /// Replace or insert the check-in for its (habit, date) and append XP awards
    pub fn apply_checkin(&mut self, checkin: CheckinRecord, awards: Vec<XpEvent>) {
        match self
            .checkins
            .iter_mut()
            .find(|c| c.habit_id == checkin.habit_id && c.date == checkin.date)
        {
            Some(existing) => *existing = checkin,
            None => self.checkins.push(checkin),
        }
        self.xp_events.extend(awards);
    }
}
