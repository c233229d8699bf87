//! Energy expenditure and nutrition targets
//!
//! # Formulas
//!
//! - BMR (Mifflin-St Jeor): `10 * kg + 6.25 * cm - 5 * age + s`, with
//!   `s = +5` for men and `s = -161` for women
//! - TDEE: `BMR * activity_factor`
//! - Calorie target: `max(TDEE * (1 - deficit), 1200)`
//! - Protein: `max(1.6 g/kg, 90 g)`, water: `30 mL/kg`
//!
//! Integer outputs are rounded half away from zero.

use serde::{Deserialize, Serialize};

use crate::models::Sex;

/// Calorie target never goes below this floor
pub const CALORIE_FLOOR_KCAL: u32 = 1200;

/// Minimum daily protein target in grams
pub const PROTEIN_FLOOR_G: f64 = 90.0;

pub const PROTEIN_G_PER_KG: f64 = 1.6;
pub const WATER_ML_PER_KG: f64 = 30.0;

const KCAL_PER_G_PROTEIN: i64 = 4;
const KCAL_PER_G_CARBS: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

/// Defaults for the daily target sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Daily step goal (default: 9000)
    pub steps: u32,

    /// Nightly sleep goal in hours (default: 7.5)
    pub sleep_hours: f64,

    /// Weekly strength minutes (default: 80)
    pub strength_min_week: u32,

    /// Weekly cardio range in minutes (default: 150-300)
    pub cardio_min_week_min: u32,
    pub cardio_min_week_max: u32,

    /// Body weight assumed when no weigh-in exists (default: 80 kg)
    pub fallback_weight_kg: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        TargetConfig {
            steps: 9000,
            sleep_hours: 7.5,
            strength_min_week: 80,
            cardio_min_week_min: 150,
            cardio_min_week_max: 300,
            fallback_weight_kg: 80.0,
        }
    }
}

/// Inputs to the calorie estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub sex: Sex,
    pub age: u32,
    pub height_cm: f64,
    pub weight_kg: f64,

    /// Default: 1.4
    pub activity_factor: f64,

    /// Fraction of TDEE to cut (default: 0.18)
    pub deficit_percent: f64,
}

impl EstimateRequest {
    pub fn new(sex: Sex, age: u32, height_cm: f64, weight_kg: f64) -> Self {
        EstimateRequest {
            sex,
            age,
            height_cm,
            weight_kg,
            activity_factor: 1.4,
            deficit_percent: 0.18,
        }
    }
}

/// Calorie and nutrient targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionEstimate {
    /// Basal metabolic rate, kcal/day
    pub bmr: f64,

    /// Total daily energy expenditure, kcal/day
    pub tdee: f64,

    pub calorie_target: u32,
    pub protein_target_g: u32,
    pub water_target_ml: u32,
    pub fiber_target_g: u32,
    pub notes: Vec<String>,
}

/// Inputs to the macro split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroSplitRequest {
    pub calorie_target: u32,
    pub protein_target_g: u32,

    /// Share of calories from fat (default: 0.30)
    pub fat_percent: f64,
}

/// Gram targets per macronutrient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroSplit {
    pub kcal: u32,
    pub protein_g: u32,
    pub carbs_g: u32,
    pub fat_g: u32,

    /// Caveats, e.g. an infeasible protein/fat combination
    pub notes: Vec<String>,
}

impl MacroSplit {
    pub fn is_feasible(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Daily and weekly activity and nutrition goals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTargets {
    pub steps: u32,
    pub sleep_hours: f64,
    pub protein_g: u32,
    pub fiber_g: u32,
    pub water_ml: u32,
    pub strength_min_week: u32,
    pub cardio_min_week_min: u32,
    pub cardio_min_week_max: u32,
}

/// Suggested change to the calorie target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalorieAdjustment {
    pub suggestion_kcal_delta: i32,
    pub reason: String,
}

/// Mifflin-St Jeor basal metabolic rate
pub fn mifflin_bmr(sex: Sex, age: u32, height_cm: f64, weight_kg: f64) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

pub fn protein_target_g(weight_kg: f64) -> u32 {
    (PROTEIN_G_PER_KG * weight_kg).max(PROTEIN_FLOOR_G).round() as u32
}

pub fn water_target_ml(weight_kg: f64) -> u32 {
    (WATER_ML_PER_KG * weight_kg).round() as u32
}

/// 25 g for women, 30 g otherwise
pub fn fiber_target_g(sex: Option<Sex>) -> u32 {
    match sex {
        Some(Sex::Female) => 25,
        _ => 30,
    }
}

pub struct NutritionEstimator;

impl NutritionEstimator {
    pub fn estimate(request: &EstimateRequest) -> NutritionEstimate {
        let bmr = mifflin_bmr(request.sex, request.age, request.height_cm, request.weight_kg);
        let tdee = bmr * request.activity_factor;
        let calorie_target =
            ((tdee * (1.0 - request.deficit_percent)).round().max(0.0) as u32).max(CALORIE_FLOOR_KCAL);

        NutritionEstimate {
            bmr,
            tdee,
            calorie_target,
            protein_target_g: protein_target_g(request.weight_kg),
            water_target_ml: water_target_ml(request.weight_kg),
            fiber_target_g: fiber_target_g(Some(request.sex)),
            notes: vec![
                "A moderate 15-20% deficit is recommended.".to_string(),
                "Prioritise protein and vegetables, sleep 7h+ if possible.".to_string(),
                "This is not medical advice.".to_string(),
            ],
        }
    }

    /// Split a calorie target into protein, fat and carbohydrate grams
    ///
    /// When protein and fat already exceed the calorie target, carbs are
    /// clamped to 0 and a caveat note is attached.
    pub fn macro_split(request: &MacroSplitRequest) -> MacroSplit {
        let kcal = f64::from(request.calorie_target);
        let fat_kcal = (request.fat_percent * kcal).round() as i64;
        let fat_g = (request.fat_percent * kcal / KCAL_PER_G_FAT).round().max(0.0) as u32;
        let protein_kcal = i64::from(request.protein_target_g) * KCAL_PER_G_PROTEIN;
        let carb_kcal = i64::from(request.calorie_target) - fat_kcal - protein_kcal;

        let mut notes = Vec::new();
        let carbs_g = if carb_kcal < 0 {
            notes.push(
                "Protein/fat targets are too high for the calorie target; lower protein or the fat share slightly."
                    .to_string(),
            );
            0
        } else {
            (carb_kcal as f64 / KCAL_PER_G_CARBS).round() as u32
        };

        MacroSplit {
            kcal: request.calorie_target,
            protein_g: request.protein_target_g,
            carbs_g,
            fat_g,
            notes,
        }
    }

    /// Target sheet from the latest body weight, if any
    pub fn daily_targets(latest_weight_kg: Option<f64>, sex: Option<Sex>, config: &TargetConfig) -> DailyTargets {
        let weight = latest_weight_kg.unwrap_or(config.fallback_weight_kg);

        DailyTargets {
            steps: config.steps,
            sleep_hours: config.sleep_hours,
            protein_g: protein_target_g(weight),
            fiber_g: fiber_target_g(sex),
            water_ml: water_target_ml(weight),
            strength_min_week: config.strength_min_week,
            cardio_min_week_min: config.cardio_min_week_min,
            cardio_min_week_max: config.cardio_min_week_max,
        }
    }

    /// Calorie change given a plateau and the trailing means of logged metrics
    ///
    /// Only a plateau with steps, sleep and protein all at 80% of target or
    /// better earns a cut.
    pub fn suggest_calorie_adjustment(
        plateau: bool,
        steps_avg: f64,
        sleep_avg: f64,
        protein_avg: f64,
        targets: &DailyTargets,
    ) -> CalorieAdjustment {
        let adherent = steps_avg >= 0.8 * f64::from(targets.steps)
            && sleep_avg >= 0.8 * targets.sleep_hours
            && protein_avg >= 0.8 * f64::from(targets.protein_g);

        match (plateau, adherent) {
            (true, true) => CalorieAdjustment {
                suggestion_kcal_delta: -100,
                reason: "Plateau with good adherence: small calorie reduction.".to_string(),
            },
            (true, false) => CalorieAdjustment {
                suggestion_kcal_delta: 0,
                reason: "Plateau but adherence is incomplete: consolidate steps, sleep and protein first."
                    .to_string(),
            },
            (false, _) => CalorieAdjustment {
                suggestion_kcal_delta: 0,
                reason: "No plateau: stay the course.".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mifflin_bmr() {
        assert!((mifflin_bmr(Sex::Male, 30, 180.0, 80.0) - 1780.0).abs() < 1e-9);
        assert!((mifflin_bmr(Sex::Female, 30, 165.0, 60.0) - 1320.25).abs() < 1e-9);
    }

    #[test]
    fn test_male_estimate() {
        let estimate = NutritionEstimator::estimate(&EstimateRequest::new(Sex::Male, 30, 180.0, 80.0));

        assert!((estimate.bmr - 1780.0).abs() < 1e-9);
        assert!((estimate.tdee - 2492.0).abs() < 1e-6);
        // 2492 * 0.82 = 2043.44
        assert_eq!(estimate.calorie_target, 2043);
        assert_eq!(estimate.protein_target_g, 128);
        assert_eq!(estimate.water_target_ml, 2400);
        assert_eq!(estimate.fiber_target_g, 30);
        assert_eq!(estimate.notes.len(), 3);
    }

    #[test]
    fn test_calorie_floor() {
        let request = EstimateRequest {
            activity_factor: 1.2,
            deficit_percent: 0.2,
            ..EstimateRequest::new(Sex::Female, 70, 150.0, 45.0)
        };
        let estimate = NutritionEstimator::estimate(&request);
        assert_eq!(estimate.calorie_target, CALORIE_FLOOR_KCAL);
        assert_eq!(estimate.protein_target_g, 90);
        assert_eq!(estimate.fiber_target_g, 25);
    }

    #[test]
    fn test_macro_split() {
        let split = NutritionEstimator::macro_split(&MacroSplitRequest {
            calorie_target: 2000,
            protein_target_g: 150,
            fat_percent: 0.30,
        });

        assert_eq!(split.fat_g, 67);
        // 2000 - 600 - 600 = 800 kcal of carbs
        assert_eq!(split.carbs_g, 200);
        assert!(split.is_feasible());
    }

    #[test]
    fn test_infeasible_macro_split() {
        let split = NutritionEstimator::macro_split(&MacroSplitRequest {
            calorie_target: 1200,
            protein_target_g: 250,
            fat_percent: 0.40,
        });

        assert_eq!(split.carbs_g, 0);
        assert_eq!(split.protein_g, 250);
        assert!(!split.is_feasible());
        assert_eq!(split.notes.len(), 1);
    }

    #[test]
    fn test_daily_targets() {
        let config = TargetConfig::default();
        let fallback = NutritionEstimator::daily_targets(None, None, &config);
        assert_eq!(fallback.protein_g, 128);
        assert_eq!(fallback.water_ml, 2400);
        assert_eq!(fallback.fiber_g, 30);
        assert_eq!(fallback.steps, 9000);

        let light = NutritionEstimator::daily_targets(Some(52.0), Some(Sex::Female), &config);
        assert_eq!(light.protein_g, 90);
        assert_eq!(light.water_ml, 1560);
        assert_eq!(light.fiber_g, 25);
    }

    #[test]
    fn test_calorie_adjustment() {
        let targets = NutritionEstimator::daily_targets(Some(80.0), None, &TargetConfig::default());

        let cut = NutritionEstimator::suggest_calorie_adjustment(true, 8000.0, 7.0, 120.0, &targets);
        assert_eq!(cut.suggestion_kcal_delta, -100);

        let hold = NutritionEstimator::suggest_calorie_adjustment(true, 3000.0, 7.0, 120.0, &targets);
        assert_eq!(hold.suggestion_kcal_delta, 0);
        assert!(hold.reason.contains("consolidate"));

        let steady = NutritionEstimator::suggest_calorie_adjustment(false, 8000.0, 7.0, 120.0, &targets);
        assert_eq!(steady.suggestion_kcal_delta, 0);
    }
}
