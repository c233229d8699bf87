//! Weekly review and daily insights
//!
//! The weekly review compares trailing-week metrics with the user's targets,
//! reports the smoothed weight change and plateau state, and produces a
//! list of suggestions that is never empty.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::energy::EnergyTier;
use crate::models::{DailyMetricRecord, WeighInRecord};
use crate::nutrition::DailyTargets;
use crate::plateau::PlateauDetector;
use crate::trend::TrendSmoother;

/// Review window and suggestion gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Days reviewed, today included (default: 7)
    pub window_days: u32,

    /// Adherence below this ratio triggers a suggestion (default: 0.8)
    pub suggestion_threshold: f64,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        ReviewConfig {
            window_days: 7,
            suggestion_threshold: 0.8,
        }
    }
}

/// Averages and sums of the metric rows in a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsAggregate {
    /// Calendar days in the window
    pub days: u32,

    /// Steps per calendar day, unlogged days counting as 0
    pub steps_per_day: f64,

    /// Mean steps over logged days only
    pub steps_logged_avg: f64,

    /// Means over days where the value was logged; 0 when never logged
    pub sleep_avg: f64,
    pub protein_avg: f64,
    pub fiber_avg: f64,
    pub water_avg: f64,

    pub strength_sum: u32,
    pub cardio_sum: u32,
}

fn mean_or_zero(values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.mean()
}

impl MetricsAggregate {
    /// Aggregate rows dated within `start..=end`
    pub fn from_rows(rows: &[DailyMetricRecord], start: NaiveDate, end: NaiveDate) -> Self {
        let in_window: Vec<&DailyMetricRecord> =
            rows.iter().filter(|r| r.date >= start && r.date <= end).collect();
        let days = ((end - start).num_days() + 1).max(1) as u32;

        let steps: Vec<f64> = in_window.iter().map(|r| f64::from(r.steps)).collect();
        let steps_total: f64 = steps.iter().sum();

        MetricsAggregate {
            days,
            steps_per_day: steps_total / f64::from(days),
            steps_logged_avg: mean_or_zero(steps),
            sleep_avg: mean_or_zero(in_window.iter().filter_map(|r| r.sleep_hours).collect()),
            protein_avg: mean_or_zero(in_window.iter().filter_map(|r| r.protein_g.map(f64::from)).collect()),
            fiber_avg: mean_or_zero(in_window.iter().filter_map(|r| r.fiber_g.map(f64::from)).collect()),
            water_avg: mean_or_zero(in_window.iter().filter_map(|r| r.water_ml.map(f64::from)).collect()),
            strength_sum: in_window.iter().map(|r| r.strength_min).sum(),
            cardio_sum: in_window.iter().map(|r| r.cardio_min).sum(),
        }
    }
}

/// Ratio of actual to target clamped to [0, 1]; 0 for a non-positive target
pub fn adherence_ratio(actual: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    (actual / target).clamp(0.0, 1.0)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Per-metric adherence ratios, each in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adherence {
    pub steps: f64,
    pub sleep: f64,
    pub protein: f64,
    pub fiber: f64,
    pub water: f64,
    pub strength: f64,
    pub cardio: f64,
}

impl Adherence {
    /// Unrounded ratios; suggestion gates compare against these
    pub fn compute(aggregate: &MetricsAggregate, targets: &DailyTargets) -> Self {
        Adherence {
            steps: adherence_ratio(aggregate.steps_per_day, f64::from(targets.steps)),
            sleep: adherence_ratio(aggregate.sleep_avg, targets.sleep_hours),
            protein: adherence_ratio(aggregate.protein_avg, f64::from(targets.protein_g)),
            fiber: adherence_ratio(aggregate.fiber_avg, f64::from(targets.fiber_g)),
            water: adherence_ratio(aggregate.water_avg, f64::from(targets.water_ml)),
            strength: adherence_ratio(f64::from(aggregate.strength_sum), f64::from(targets.strength_min_week)),
            cardio: adherence_ratio(f64::from(aggregate.cardio_sum), f64::from(targets.cardio_min_week_min)),
        }
    }

    /// Ratios rounded to 3 decimals for reporting
    pub fn rounded(&self) -> Self {
        Adherence {
            steps: round3(self.steps),
            sleep: round3(self.sleep),
            protein: round3(self.protein),
            fiber: round3(self.fiber),
            water: round3(self.water),
            strength: round3(self.strength),
            cardio: round3(self.cardio),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReview {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub adherence: Adherence,
    pub plateau: bool,

    /// Smoothed weight change over the window, when at least two weigh-ins exist
    pub trend_delta_kg: Option<Decimal>,

    pub suggestions: Vec<String>,
}

pub const PROTEIN_SUGGESTION: &str = "Lock in 30-40 g of protein at breakfast.";
pub const STEPS_SUGGESTION: &str = "Add +1500 steps a day (5-10 minute active breaks).";
pub const SLEEP_SUGGESTION: &str = "Digital curfew 60 minutes before bed, aim for 7-8 h.";
pub const PLATEAU_SUGGESTION: &str =
    "Anti-plateau week: +10% steps, +20 g protein a day, watch liquid snacks.";
pub const REVIEW_FALLBACK: &str = "Great consistency, keep going 👏";

/// Builds the weekly review from trailing metrics and weigh-ins
#[derive(Debug, Clone, Default)]
pub struct WeeklyReviewer {
    config: ReviewConfig,
    smoother: TrendSmoother,
    detector: PlateauDetector,
}

impl WeeklyReviewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_components(config: ReviewConfig, smoother: TrendSmoother, detector: PlateauDetector) -> Self {
        WeeklyReviewer {
            config,
            smoother,
            detector,
        }
    }

    /// First day of the review window ending at `today`
    pub fn window_start(&self, today: NaiveDate) -> NaiveDate {
        let span = u64::from(self.config.window_days.saturating_sub(1));
        today.checked_sub_days(Days::new(span)).unwrap_or(today)
    }

    /// `weigh_ins` must be date-ascending; plateau detection uses the most
    /// recent weigh-ins regardless of the review window
    pub fn review(
        &self,
        metrics: &[DailyMetricRecord],
        weigh_ins: &[WeighInRecord],
        targets: &DailyTargets,
        today: NaiveDate,
    ) -> WeeklyReview {
        let start = self.window_start(today);
        let aggregate = MetricsAggregate::from_rows(metrics, start, today);
        let raw = Adherence::compute(&aggregate, targets);

        let window_weigh_ins: Vec<WeighInRecord> = weigh_ins
            .iter()
            .filter(|w| w.date >= start && w.date <= today)
            .cloned()
            .collect();
        let trend_delta_kg = TrendSmoother::trend_delta(&self.smoother.smooth(&window_weigh_ins));
        let plateau = self.detector.detect(weigh_ins);

        let suggestions = self.suggestions(&raw, plateau);

        WeeklyReview {
            start,
            end: today,
            adherence: raw.rounded(),
            plateau,
            trend_delta_kg,
            suggestions,
        }
    }

    fn suggestions(&self, adherence: &Adherence, plateau: bool) -> Vec<String> {
        let threshold = self.config.suggestion_threshold;
        let gates = [
            (adherence.protein < threshold, PROTEIN_SUGGESTION),
            (adherence.steps < threshold, STEPS_SUGGESTION),
            (adherence.sleep < threshold, SLEEP_SUGGESTION),
            (plateau, PLATEAU_SUGGESTION),
        ];

        let suggestions: Vec<String> = gates
            .iter()
            .filter(|(triggered, _)| *triggered)
            .map(|(_, text)| text.to_string())
            .collect();

        if suggestions.is_empty() {
            vec![REVIEW_FALLBACK.to_string()]
        } else {
            suggestions
        }
    }
}

/// Tip catalog tag picked for today's insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipTag {
    Plateau,
    EnergyLow,
    Hydration,
}

impl TipTag {
    /// Plateau first, then low energy, hydration otherwise
    pub fn select(energy: EnergyTier, plateau: bool) -> Self {
        if plateau {
            TipTag::Plateau
        } else if energy == EnergyTier::Low {
            TipTag::EnergyLow
        } else {
            TipTag::Hydration
        }
    }
}

/// Tip used when the catalog has nothing for the selected tag
pub const DEFAULT_TIP: &str = "Stay the course: micro-steps today, consistency tomorrow.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyInsights {
    pub energy: EnergyTier,

    /// Rounded to 3 decimals
    pub completion_ratio_7d: f64,

    pub streak_soft: u32,
    pub plateau: bool,
    pub tip_tag: TipTag,
    pub tip: String,
}

impl DailyInsights {
    pub fn new(energy: EnergyTier, completion_ratio: f64, streak_soft: u32, plateau: bool) -> Self {
        DailyInsights {
            energy,
            completion_ratio_7d: round3(completion_ratio),
            streak_soft,
            plateau,
            tip_tag: TipTag::select(energy, plateau),
            tip: DEFAULT_TIP.to_string(),
        }
    }
}

/// One entry of the trailing-week metric chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsDay {
    pub date: NaiveDate,
    pub steps: u32,
    pub sleep_hours: Option<f64>,
    pub protein_g: Option<u32>,
    pub water_ml: Option<u32>,
}

/// Seven entries ending today; days without a row have 0 steps and no values
pub fn week_series(rows: &[DailyMetricRecord], today: NaiveDate) -> Vec<MetricsDay> {
    let start = today.checked_sub_days(Days::new(6)).unwrap_or(today);

    start
        .iter_days()
        .take_while(|day| *day <= today)
        .map(|day| match rows.iter().rev().find(|r| r.date == day) {
            Some(row) => MetricsDay {
                date: day,
                steps: row.steps,
                sleep_hours: row.sleep_hours,
                protein_g: row.protein_g,
                water_ml: row.water_ml,
            },
            None => MetricsDay {
                date: day,
                steps: 0,
                sleep_hours: None,
                protein_g: None,
                water_ml: None,
            },
        })
        .collect()
}
