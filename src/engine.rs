//! Engine facade over one user's snapshot
//!
//! `CoachEngine` wires every component to a single [`CoachConfig`] and answers
//! each query from a [`UserSnapshot`] and the caller's notion of "today".
//! It holds no per-user state, so one engine can serve any number of
//! snapshots, concurrently if needed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::challenge::{ChallengeProgress, HydrationChallenge};
use crate::coach::{CoachMessage, CoachMessenger, CoachSignals};
use crate::config::CoachConfig;
use crate::energy::{EnergyClassifier, EnergyTier};
use crate::error::{CoachError, Result};
use crate::garden::GardenState;
use crate::leveling::{LevelStatus, LevelingEngine};
use crate::models::{CheckinRecord, HabitId, XpEvent};
use crate::nutrition::{
    CalorieAdjustment, DailyTargets, EstimateRequest, MacroSplit, MacroSplitRequest, NutritionEstimate,
    NutritionEstimator,
};
use crate::plan::{DailyPlan, PlanSelector};
use crate::plateau::{PlateauAnalysis, PlateauDetector};
use crate::review::{week_series, DailyInsights, MetricsAggregate, MetricsDay, WeeklyReview, WeeklyReviewer};
use crate::snapshot::UserSnapshot;
use crate::streak::StreakCalculator;
use crate::trend::{TrendPoint, TrendSmoother};

/// Hard and soft streaks ending today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub hard: u32,
    pub soft: u32,
}

/// Result of a check-in upsert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckinOutcome {
    /// Row to store, replacing any existing one for (habit, date)
    pub checkin: CheckinRecord,

    /// Ledger entries to append
    pub awards: Vec<XpEvent>,

    /// Done check-ins today after the upsert
    pub done_today: u32,
}

#[derive(Debug, Clone)]
pub struct CoachEngine {
    config: CoachConfig,
    smoother: TrendSmoother,
    detector: PlateauDetector,
    classifier: EnergyClassifier,
    streaks: StreakCalculator,
    leveling: LevelingEngine,
    reviewer: WeeklyReviewer,
    messenger: CoachMessenger,
    challenge: HydrationChallenge,
}

impl Default for CoachEngine {
    fn default() -> Self {
        Self::with_config(CoachConfig::default())
    }
}

impl CoachEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CoachConfig) -> Self {
        let smoother = TrendSmoother::with_config(config.trend.clone());
        let detector = PlateauDetector::with_config(config.plateau.clone());

        CoachEngine {
            smoother: smoother.clone(),
            detector: detector.clone(),
            classifier: EnergyClassifier::with_config(config.energy.clone()),
            streaks: StreakCalculator::with_config(config.streak.clone()),
            leveling: LevelingEngine::with_config(config.xp.clone()),
            reviewer: WeeklyReviewer::with_components(config.review.clone(), smoother, detector),
            messenger: CoachMessenger::with_thresholds(config.coach.clone()),
            challenge: HydrationChallenge::with_config(config.challenge.clone()),
            config,
        }
    }

    pub fn config(&self) -> &CoachConfig {
        &self.config
    }

    /// Smoothed weight series
    pub fn trend(&self, snapshot: &UserSnapshot) -> Vec<TrendPoint> {
        self.smoother.smooth(&snapshot.weigh_ins)
    }

    pub fn plateau(&self, snapshot: &UserSnapshot) -> PlateauAnalysis {
        let analysis = self.detector.analyze(&snapshot.weigh_ins);
        debug!(samples = analysis.samples, slope = ?analysis.slope, plateau = analysis.plateau, "Plateau check");
        analysis
    }

    pub fn completion_ratio(&self, snapshot: &UserSnapshot, today: NaiveDate) -> f64 {
        self.classifier.completion_ratio(&snapshot.checkins, today)
    }

    pub fn energy(&self, snapshot: &UserSnapshot, today: NaiveDate) -> EnergyTier {
        let ratio = self.completion_ratio(snapshot, today);
        let tier = self.classifier.classify(ratio);
        debug!(ratio, tier = %tier, "Energy classified");
        tier
    }

    pub fn streaks(&self, snapshot: &UserSnapshot, today: NaiveDate) -> StreakSummary {
        let counts = StreakCalculator::aggregate_daily_done(&snapshot.checkins);
        let summary = StreakSummary {
            hard: self.streaks.hard_streak(&counts, today),
            soft: self.streaks.soft_streak(&counts, today),
        };
        debug!(hard = summary.hard, soft = summary.soft, "Streaks computed");
        summary
    }

    pub fn plan_today(&self, snapshot: &UserSnapshot, today: NaiveDate) -> DailyPlan {
        let tier = self.energy(snapshot, today);
        PlanSelector::plan(tier, &snapshot.habits, &snapshot.checkins, today)
    }

    pub fn garden_state(&self, snapshot: &UserSnapshot, today: NaiveDate) -> GardenState {
        let counts = StreakCalculator::aggregate_daily_done(&snapshot.checkins);
        GardenState::from_counts(&self.streaks, &counts, today)
    }

    pub fn gamify_status(&self, snapshot: &UserSnapshot) -> LevelStatus {
        self.leveling.status(&snapshot.xp_events)
    }

    pub fn daily_targets(&self, snapshot: &UserSnapshot) -> DailyTargets {
        NutritionEstimator::daily_targets(
            snapshot.latest_weight_kg(),
            snapshot.profile.sex,
            &self.config.targets,
        )
    }

    /// Calorie estimate from the stored profile
    ///
    /// Needs sex, birth year and height; weight comes from the latest weigh-in,
    /// else the declared profile weight.
    pub fn estimate_from_profile(&self, snapshot: &UserSnapshot, today: NaiveDate) -> Result<NutritionEstimate> {
        let profile = &snapshot.profile;
        let missing = |field: &str| CoachError::Validation(format!("profile.{} is required for an estimate", field));

        let sex = profile.sex.ok_or_else(|| missing("sex"))?;
        let age = profile.age_on(today).ok_or_else(|| missing("birth_year"))?;
        let height_cm = profile.height_cm.ok_or_else(|| missing("height_cm"))?;
        let weight_kg = snapshot
            .latest_weight_kg()
            .or(profile.weight_kg)
            .ok_or_else(|| missing("weight_kg"))?;

        let mut request = EstimateRequest::new(sex, age, height_cm, weight_kg);
        if let Some(factor) = profile.activity_factor {
            request.activity_factor = factor;
        }
        if let Some(deficit) = profile.deficit_percent {
            request.deficit_percent = deficit;
        }

        Ok(self.estimate(&request))
    }

    pub fn estimate(&self, request: &EstimateRequest) -> NutritionEstimate {
        let estimate = NutritionEstimator::estimate(request);
        debug!(bmr = estimate.bmr, tdee = estimate.tdee, target = estimate.calorie_target, "Nutrition estimate");
        estimate
    }

    pub fn macro_split(&self, request: &MacroSplitRequest) -> MacroSplit {
        let split = NutritionEstimator::macro_split(request);
        if !split.is_feasible() {
            warn!(
                kcal = request.calorie_target,
                protein_g = request.protein_target_g,
                fat_percent = request.fat_percent,
                "Macro split infeasible, carbs clamped to 0"
            );
        }
        split
    }

    pub fn weekly_review(&self, snapshot: &UserSnapshot, today: NaiveDate) -> WeeklyReview {
        let targets = self.daily_targets(snapshot);
        let review = self
            .reviewer
            .review(&snapshot.metrics, &snapshot.weigh_ins, &targets, today);
        debug!(
            plateau = review.plateau,
            trend_delta = ?review.trend_delta_kg,
            suggestions = review.suggestions.len(),
            "Weekly review"
        );
        review
    }

    pub fn daily_insights(&self, snapshot: &UserSnapshot, today: NaiveDate) -> DailyInsights {
        let ratio = self.completion_ratio(snapshot, today);
        let energy = self.classifier.classify(ratio);
        let soft = self.streaks(snapshot, today).soft;
        let plateau = self.plateau(snapshot).plateau;

        DailyInsights::new(energy, ratio, soft, plateau)
    }

    /// Single prioritized message from today's metrics
    pub fn coach_message(&self, snapshot: &UserSnapshot, today: NaiveDate) -> CoachMessage {
        let signals = CoachSignals::new(
            self.plateau(snapshot).plateau,
            self.energy(snapshot, today),
            snapshot.metrics_on(today),
            self.daily_targets(snapshot),
        );

        let message = self.messenger.message(&signals);
        info!(rule = %message.rule, "Coach rule selected");
        message
    }

    /// Calorie change from plateau state and the review window's logged means
    pub fn adjust_calories(&self, snapshot: &UserSnapshot, today: NaiveDate) -> CalorieAdjustment {
        let targets = self.daily_targets(snapshot);
        let start = self.reviewer.window_start(today);
        let aggregate = MetricsAggregate::from_rows(&snapshot.metrics, start, today);
        let plateau = self.plateau(snapshot).plateau;

        let adjustment = NutritionEstimator::suggest_calorie_adjustment(
            plateau,
            aggregate.steps_logged_avg,
            aggregate.sleep_avg,
            aggregate.protein_avg,
            &targets,
        );
        info!(delta = adjustment.suggestion_kcal_delta, "Calorie adjustment");
        adjustment
    }

    /// Upsert a check-in for `date` and compute the XP it earns
    ///
    /// The snapshot is not modified; apply the outcome with
    /// [`UserSnapshot::apply_checkin`] or persist it directly.
    pub fn record_checkin(
        &self,
        snapshot: &UserSnapshot,
        habit_id: HabitId,
        date: NaiveDate,
        done: bool,
    ) -> Result<CheckinOutcome> {
        if !snapshot.habits.iter().any(|h| h.id == habit_id) {
            return Err(CoachError::Validation(format!("Unknown habit: {}", habit_id)));
        }

        let previously_done = snapshot
            .checkin(habit_id, date)
            .map(|c| c.done)
            .unwrap_or(false);

        let others_done = snapshot
            .checkins
            .iter()
            .filter(|c| c.date == date && c.habit_id != habit_id && c.done)
            .count() as u32;
        let done_today = others_done + u32::from(done);

        let awards = self.leveling.awards_for_checkin(
            snapshot.user_id,
            habit_id,
            previously_done,
            done,
            done_today,
        );
        debug!(habit_id, done, previously_done, done_today, awards = awards.len(), "Check-in recorded");

        Ok(CheckinOutcome {
            checkin: CheckinRecord {
                user_id: snapshot.user_id,
                habit_id,
                date,
                done,
            },
            awards,
            done_today,
        })
    }

    pub fn challenge_progress(&self, snapshot: &UserSnapshot, start: NaiveDate, today: NaiveDate) -> ChallengeProgress {
        self.challenge.progress(&snapshot.metrics, start, today)
    }

    pub fn week_series(&self, snapshot: &UserSnapshot, today: NaiveDate) -> Vec<MetricsDay> {
        week_series(&snapshot.metrics, today)
    }
}
