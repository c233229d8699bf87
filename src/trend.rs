//! Exponential smoothing of the body-weight series
//!
//! Daily weigh-ins are noisy (hydration, meal timing), so the displayed trend
//! is an exponentially weighted moving average:
//!
//! `trend_0 = w_0`, `trend_i = alpha * w_i + (1 - alpha) * trend_(i-1)`
//!
//! The running value keeps full `Decimal` precision; only the emitted trend is
//! rounded to 2 decimal places.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::models::WeighInRecord;

/// Smoothing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Weight of the newest sample, in (0, 1] (default: 0.3)
    pub alpha: Decimal,
}

impl Default for TrendConfig {
    fn default() -> Self {
        TrendConfig { alpha: dec!(0.3) }
    }
}

/// One smoothed sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,

    /// Raw weigh-in in kilograms
    pub weight: Decimal,

    /// Smoothed weight, rounded to 2 decimal places
    pub trend: Decimal,
}

/// EWMA smoother over an ascending weigh-in series
#[derive(Debug, Clone, Default)]
pub struct TrendSmoother {
    config: TrendConfig,
}

impl TrendSmoother {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TrendConfig) -> Self {
        TrendSmoother { config }
    }

    pub fn with_alpha(alpha: Decimal) -> Self {
        TrendSmoother {
            config: TrendConfig { alpha },
        }
    }

    pub fn alpha(&self) -> Decimal {
        self.config.alpha
    }

    /// Smooth a date-ascending series, one output point per input sample
    pub fn smooth(&self, weigh_ins: &[WeighInRecord]) -> Vec<TrendPoint> {
        let alpha = self.config.alpha;
        let keep = Decimal::ONE - alpha;
        let mut running: Option<Decimal> = None;

        weigh_ins
            .iter()
            .map(|w| {
                let next = match running {
                    None => w.kg,
                    Some(prev) => alpha * w.kg + keep * prev,
                };
                running = Some(next);

                TrendPoint {
                    date: w.date,
                    weight: w.kg,
                    trend: next.round_dp(2),
                }
            })
            .collect()
    }

    /// Change of the smoothed weight from the first to the last point
    ///
    /// `None` when fewer than two points exist.
    pub fn trend_delta(points: &[TrendPoint]) -> Option<Decimal> {
        match (points.first(), points.last()) {
            (Some(first), Some(last)) if points.len() >= 2 => {
                Some((last.trend - first.trend).round_dp(2))
            }
            _ => None,
        }
    }
}
