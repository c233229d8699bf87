//! Coach message rule cascade
//!
//! Exactly one message is produced per evaluation. Rules are checked in a
//! fixed order and the first whose predicate holds wins:
//!
//! 1. weight plateau
//! 2. low energy
//! 3. today's protein below 70% of target
//! 4. today's steps below 70% of target
//! 5. today's sleep below 80% of target
//! 6. default encouragement

use serde::{Deserialize, Serialize};

use crate::energy::EnergyTier;
use crate::models::DailyMetricRecord;
use crate::nutrition::DailyTargets;

/// Fractions of the daily target below which a metric counts as low
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachThresholds {
    /// Protein fraction (default: 0.7)
    pub protein: f64,

    /// Steps fraction (default: 0.7)
    pub steps: f64,

    /// Sleep fraction (default: 0.8)
    pub sleep: f64,
}

impl Default for CoachThresholds {
    fn default() -> Self {
        CoachThresholds {
            protein: 0.7,
            steps: 0.7,
            sleep: 0.8,
        }
    }
}

/// Everything the cascade looks at
#[derive(Debug, Clone, PartialEq)]
pub struct CoachSignals {
    pub plateau: bool,
    pub energy: EnergyTier,

    /// Today's values; unlogged counts as 0
    pub protein_g: f64,
    pub steps: f64,
    pub sleep_hours: f64,

    pub targets: DailyTargets,
}

impl CoachSignals {
    pub fn new(
        plateau: bool,
        energy: EnergyTier,
        today: Option<&DailyMetricRecord>,
        targets: DailyTargets,
    ) -> Self {
        CoachSignals {
            plateau,
            energy,
            protein_g: today.and_then(|m| m.protein_g).map(f64::from).unwrap_or(0.0),
            steps: today.map(|m| f64::from(m.steps)).unwrap_or(0.0),
            sleep_hours: today.and_then(|m| m.sleep_hours).unwrap_or(0.0),
            targets,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoachRule {
    Plateau,
    LowEnergy,
    LowProtein,
    LowSteps,
    LowSleep,
    Encouragement,
}

impl std::fmt::Display for CoachRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoachRule::Plateau => write!(f, "plateau"),
            CoachRule::LowEnergy => write!(f, "low_energy"),
            CoachRule::LowProtein => write!(f, "low_protein"),
            CoachRule::LowSteps => write!(f, "low_steps"),
            CoachRule::LowSleep => write!(f, "low_sleep"),
            CoachRule::Encouragement => write!(f, "encouragement"),
        }
    }
}

type RulePredicate = fn(&CoachSignals, &CoachThresholds) -> bool;

fn plateau(s: &CoachSignals, _: &CoachThresholds) -> bool {
    s.plateau
}

fn low_energy(s: &CoachSignals, _: &CoachThresholds) -> bool {
    s.energy == EnergyTier::Low
}

fn low_protein(s: &CoachSignals, t: &CoachThresholds) -> bool {
    s.protein_g < t.protein * f64::from(s.targets.protein_g)
}

fn low_steps(s: &CoachSignals, t: &CoachThresholds) -> bool {
    s.steps < t.steps * f64::from(s.targets.steps)
}

fn low_sleep(s: &CoachSignals, t: &CoachThresholds) -> bool {
    s.sleep_hours < t.sleep * s.targets.sleep_hours
}

fn always(_: &CoachSignals, _: &CoachThresholds) -> bool {
    true
}

/// Evaluation order; the last rule always matches
const RULES: [(CoachRule, RulePredicate); 6] = [
    (CoachRule::Plateau, plateau),
    (CoachRule::LowEnergy, low_energy),
    (CoachRule::LowProtein, low_protein),
    (CoachRule::LowSteps, low_steps),
    (CoachRule::LowSleep, low_sleep),
    (CoachRule::Encouragement, always),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachMessage {
    pub rule: CoachRule,
    pub title: String,
    pub message: String,
    pub actions: Vec<String>,
}

impl CoachMessage {
    fn build(rule: CoachRule, title: &str, message: &str, actions: [&str; 3]) -> Self {
        CoachMessage {
            rule,
            title: title.to_string(),
            message: message.to_string(),
            actions: actions.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Fixed copy for a rule
    pub fn for_rule(rule: CoachRule) -> Self {
        match rule {
            CoachRule::Plateau => Self::build(
                rule,
                "Anti-plateau week 🔧",
                "Keep the deficit but add stimulus: move a bit more, prioritize protein and fiber, sleep better.",
                [
                    "Add +1500 steps a day for 7 days",
                    "Add +20 g protein a day (greek yogurt, eggs, tuna)",
                    "Swap one sugary snack for fruit and cottage cheese",
                ],
            ),
            CoachRule::LowEnergy => Self::build(
                rule,
                "Micro-wins today ✨",
                "Low energy: aim for minimal momentum, not perfection.",
                [
                    "Walk 5 minutes after your next meal",
                    "Drink 500 ml of water now",
                    "Prepare a protein-rich breakfast for tomorrow",
                ],
            ),
            CoachRule::LowProtein => Self::build(
                rule,
                "Protein first 🍳",
                "Hitting the protein target helps satiety and preserves muscle.",
                [
                    "Aim for 30-40 g at breakfast",
                    "Add a lean source to lunch (chicken, tuna, tofu)",
                    "Keep a protein snack ready (cottage cheese, nuts)",
                ],
            ),
            CoachRule::LowSteps => Self::build(
                rule,
                "NEAT boost 🚶",
                "More light movement burns more calories without wearing you out.",
                [
                    "Two 10-minute active breaks",
                    "Take a call while walking",
                    "Stairs over the elevator today",
                ],
            ),
            CoachRule::LowSleep => Self::build(
                rule,
                "Sleep is a superpower 😴",
                "Better sleep means steadier hunger and better decisions.",
                [
                    "Screens off 60 minutes before bed",
                    "Keep the bedroom cooler",
                    "Fixed bedtime (±15 min)",
                ],
            ),
            CoachRule::Encouragement => Self::build(
                rule,
                "You're on a roll 🚀",
                "Steady progress: you can step it up a notch while keeping it simple.",
                [
                    "One 20-minute strength session this week",
                    "Vegetables at every meal today",
                    "Plan tomorrow's breakfast (30-40 g protein)",
                ],
            ),
        }
    }
}

/// Priority cascade over [`CoachSignals`]
#[derive(Debug, Clone, Default)]
pub struct CoachMessenger {
    thresholds: CoachThresholds,
}

impl CoachMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: CoachThresholds) -> Self {
        CoachMessenger { thresholds }
    }

    /// First rule whose predicate holds
    pub fn select_rule(&self, signals: &CoachSignals) -> CoachRule {
        RULES
            .iter()
            .find(|(_, predicate)| predicate(signals, &self.thresholds))
            .map(|(rule, _)| *rule)
            .unwrap_or(CoachRule::Encouragement)
    }

    pub fn message(&self, signals: &CoachSignals) -> CoachMessage {
        CoachMessage::for_rule(self.select_rule(signals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::{NutritionEstimator, TargetConfig};

    fn signals(plateau: bool, energy: EnergyTier, protein: f64, steps: f64, sleep: f64) -> CoachSignals {
        CoachSignals {
            plateau,
            energy,
            protein_g: protein,
            steps,
            sleep_hours: sleep,
            // protein 128, steps 9000, sleep 7.5
            targets: NutritionEstimator::daily_targets(Some(80.0), None, &TargetConfig::default()),
        }
    }

    #[test]
    fn test_plateau_beats_everything() {
        let messenger = CoachMessenger::new();
        let s = signals(true, EnergyTier::Low, 0.0, 0.0, 0.0);
        assert_eq!(messenger.select_rule(&s), CoachRule::Plateau);
    }

    #[test]
    fn test_cascade_order() {
        let messenger = CoachMessenger::new();
        assert_eq!(
            messenger.select_rule(&signals(false, EnergyTier::Low, 0.0, 0.0, 0.0)),
            CoachRule::LowEnergy
        );
        assert_eq!(
            messenger.select_rule(&signals(false, EnergyTier::Medium, 80.0, 0.0, 0.0)),
            CoachRule::LowProtein
        );
        assert_eq!(
            messenger.select_rule(&signals(false, EnergyTier::Medium, 120.0, 5000.0, 0.0)),
            CoachRule::LowSteps
        );
        assert_eq!(
            messenger.select_rule(&signals(false, EnergyTier::High, 120.0, 7000.0, 5.0)),
            CoachRule::LowSleep
        );
        assert_eq!(
            messenger.select_rule(&signals(false, EnergyTier::High, 120.0, 7000.0, 7.0)),
            CoachRule::Encouragement
        );
    }

    #[test]
    fn test_threshold_edges_are_strict() {
        let messenger = CoachMessenger::new();
        // 0.7 * 9000 = 6300 is not low; 0.8 * 7.5 = 6.0 is not low
        let s = signals(false, EnergyTier::High, 128.0, 6300.0, 6.0);
        assert_eq!(messenger.select_rule(&s), CoachRule::Encouragement);
    }

    #[test]
    fn test_messages_carry_three_actions() {
        for (rule, _) in RULES.iter() {
            let message = CoachMessage::for_rule(*rule);
            assert_eq!(message.rule, *rule);
            assert_eq!(message.actions.len(), 3);
            assert!(!message.title.is_empty());
        }
    }

    #[test]
    fn test_missing_metrics_count_as_zero() {
        let targets = NutritionEstimator::daily_targets(None, None, &TargetConfig::default());
        let s = CoachSignals::new(false, EnergyTier::High, None, targets);
        assert_eq!(s.protein_g, 0.0);
        assert_eq!(CoachMessenger::new().select_rule(&s), CoachRule::LowProtein);
    }
}
