//! Weight plateau detection
//!
//! Fits an ordinary least-squares line of weight against sample index over
//! the most recent weigh-ins and reports a plateau when the slope is nearly
//! flat. Samples are assumed equally spaced regardless of calendar gaps, so
//! the slope is in kilograms per sample rather than per day. The sums are
//! kept in `Decimal` so a series stepping by exactly the threshold compares
//! exactly against it.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::models::WeighInRecord;

/// Plateau detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateauConfig {
    /// Number of most recent weigh-ins considered (default: 14)
    pub window: usize,

    /// Below this many samples no plateau is reported (default: 5)
    pub min_samples: usize,

    /// Absolute slope under which the series counts as flat, kg/sample (default: 0.02)
    pub slope_threshold: Decimal,
}

impl Default for PlateauConfig {
    fn default() -> Self {
        PlateauConfig {
            window: 14,
            min_samples: 5,
            slope_threshold: dec!(0.02),
        }
    }
}

/// Result of a plateau check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateauAnalysis {
    /// Number of weigh-ins used
    pub samples: usize,

    /// Fitted slope in kg per sample; `None` with insufficient data
    pub slope: Option<Decimal>,

    pub plateau: bool,
}

/// Least-squares plateau detector
#[derive(Debug, Clone, Default)]
pub struct PlateauDetector {
    config: PlateauConfig,
}

impl PlateauDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PlateauConfig) -> Self {
        PlateauDetector { config }
    }

    /// Analyze the most recent window of weigh-ins, given in any order
    pub fn analyze(&self, weigh_ins: &[WeighInRecord]) -> PlateauAnalysis {
        let mut recent: Vec<&WeighInRecord> = weigh_ins.iter().collect();
        recent.sort_by_key(|w| w.date);

        let skip = recent.len().saturating_sub(self.config.window);
        let weights: Vec<Decimal> = recent[skip..].iter().map(|w| w.kg).collect();

        let samples = weights.len();
        if samples < self.config.min_samples {
            return PlateauAnalysis {
                samples,
                slope: None,
                plateau: false,
            };
        }

        let slope = Self::index_slope(&weights);
        PlateauAnalysis {
            samples,
            slope: Some(slope),
            plateau: slope.abs() < self.config.slope_threshold,
        }
    }

    pub fn detect(&self, weigh_ins: &[WeighInRecord]) -> bool {
        self.analyze(weigh_ins).plateau
    }

    /// OLS slope of `ys` against 0..n-1
    ///
    /// Uses the closed form `(nΣxy - ΣxΣy) / (nΣx² - (Σx)²)` so the only
    /// inexact step is the final division. Returns zero for fewer than two
    /// samples.
    pub fn index_slope(ys: &[Decimal]) -> Decimal {
        if ys.len() < 2 {
            return Decimal::ZERO;
        }

        let n = Decimal::from(ys.len());
        let (sum_x, sum_y, sum_xy, sum_xx) = ys.iter().enumerate().fold(
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
            |(sx, sy, sxy, sxx), (i, y)| {
                let x = Decimal::from(i);
                (sx + x, sy + y, sxy + x * y, sxx + x * x)
            },
        );

        let numerator = n * sum_xy - sum_x * sum_y;
        let denominator = n * sum_xx - sum_x * sum_x;
        numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal::prelude::FromPrimitive;
    use uuid::Uuid;

    fn series(values: &[f64]) -> Vec<WeighInRecord> {
        let start = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, kg)| WeighInRecord {
                user_id: Uuid::nil(),
                date: start + chrono::Days::new(i as u64),
                kg: Decimal::from_f64(*kg).unwrap(),
            })
            .collect()
    }

    #[test]
    fn test_insufficient_samples() {
        let analysis = PlateauDetector::new().analyze(&series(&[80.0, 80.0, 80.0, 80.0]));
        assert_eq!(analysis.samples, 4);
        assert_eq!(analysis.slope, None);
        assert!(!analysis.plateau);
    }

    #[test]
    fn test_flat_series_is_plateau() {
        assert!(PlateauDetector::new().detect(&series(&[80.0; 5])));
    }

    #[test]
    fn test_losing_series_is_not_plateau() {
        let weights: Vec<f64> = (0..10).map(|i| 85.0 - 0.1 * i as f64).collect();
        let analysis = PlateauDetector::new().analyze(&series(&weights));
        assert!(!analysis.plateau);
        let slope = analysis.slope.unwrap();
        assert!((slope + dec!(0.1)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut records = series(&[84.0, 83.5, 83.0, 82.5, 82.0, 81.5]);
        let ascending = PlateauDetector::new().analyze(&records);
        records.reverse();
        let descending = PlateauDetector::new().analyze(&records);
        assert_eq!(ascending, descending);
        assert_eq!(ascending.slope, Some(dec!(-0.5)));
    }

    #[test]
    fn test_only_recent_window_is_used() {
        // Steep loss followed by 14 flat samples
        let mut weights: Vec<f64> = (0..10).map(|i| 95.0 - i as f64).collect();
        weights.extend(std::iter::repeat(80.0).take(14));

        let analysis = PlateauDetector::new().analyze(&series(&weights));
        assert_eq!(analysis.samples, 14);
        assert!(analysis.plateau);
    }

    #[test]
    fn test_index_slope_guards() {
        assert_eq!(PlateauDetector::index_slope(&[]), Decimal::ZERO);
        assert_eq!(PlateauDetector::index_slope(&[dec!(80.0)]), Decimal::ZERO);
        assert_eq!(PlateauDetector::index_slope(&[dec!(1), dec!(2), dec!(3)]), dec!(1));
    }

    #[test]
    fn test_step_at_threshold_is_not_plateau() {
        let weights = [dec!(60.00), dec!(60.02), dec!(60.04), dec!(60.06), dec!(60.08)];
        let records: Vec<WeighInRecord> = series(&[0.0; 5])
            .into_iter()
            .zip(weights)
            .map(|(record, kg)| WeighInRecord { kg, ..record })
            .collect();

        let analysis = PlateauDetector::new().analyze(&records);
        assert_eq!(analysis.slope, Some(dec!(0.02)));
        assert!(!analysis.plateau);
    }

    #[test]
    fn test_step_just_under_threshold_is_plateau() {
        let records: Vec<WeighInRecord> = series(&[0.0; 6])
            .into_iter()
            .enumerate()
            .map(|(i, record)| WeighInRecord {
                kg: Decimal::new(7000 - i as i64, 2),
                ..record
            })
            .collect();
        let analysis = PlateauDetector::new().analyze(&records);
        assert_eq!(analysis.slope, Some(dec!(-0.01)));
        assert!(analysis.plateau);
    }

    proptest! {
        #[test]
        fn test_monotonic_series_never_plateaus(
            start_hundredths in 6000i64..12000i64,
            step_hundredths in 2i64..50i64,
            n in 5usize..20usize,
            gaining in proptest::bool::ANY,
        ) {
            let step = if gaining { step_hundredths } else { -step_hundredths };
            let records: Vec<WeighInRecord> = series(&vec![0.0; n])
                .into_iter()
                .enumerate()
                .map(|(i, record)| WeighInRecord {
                    kg: Decimal::new(start_hundredths + step * i as i64, 2),
                    ..record
                })
                .collect();
            prop_assert!(!PlateauDetector::new().detect(&records));
        }

        #[test]
        fn test_constant_series_always_plateaus(kg in 40.0f64..200.0f64, n in 5usize..20usize) {
            prop_assert!(PlateauDetector::new().detect(&series(&vec![kg; n])));
        }
    }
}
