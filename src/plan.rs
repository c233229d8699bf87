use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::energy::EnergyTier;
use crate::models::{CheckinRecord, HabitCategory, HabitDefinition};

/// Category groups contributing at most one habit each to the daily plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryGroup {
    Nutrition,
    Movement,
    HydrationLifestyle,
}

impl CategoryGroup {
    /// Plan order
    pub const ALL: [CategoryGroup; 3] = [
        CategoryGroup::Nutrition,
        CategoryGroup::Movement,
        CategoryGroup::HydrationLifestyle,
    ];

    pub fn contains(&self, category: HabitCategory) -> bool {
        match self {
            CategoryGroup::Nutrition => category == HabitCategory::Nutrition,
            CategoryGroup::Movement => category == HabitCategory::Movement,
            CategoryGroup::HydrationLifestyle => {
                matches!(category, HabitCategory::Hydration | HabitCategory::Lifestyle)
            }
        }
    }
}

/// A planned habit with today's completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedHabit {
    #[serde(flatten)]
    pub habit: HabitDefinition,
    pub done: bool,
}

/// Today's plan as returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPlan {
    pub date: NaiveDate,
    pub energy: EnergyTier,
    pub items: Vec<PlannedHabit>,
    pub message: String,
}

/// Picks today's habits for an energy tier
pub struct PlanSelector;

impl PlanSelector {
    /// Up to one habit per category group, difficulty capped by the tier
    ///
    /// Within a group the easiest eligible habit wins, ties broken by the
    /// lowest identifier.
    pub fn select(tier: EnergyTier, habits: &[HabitDefinition]) -> Vec<HabitDefinition> {
        let cap = tier.difficulty_cap();

        CategoryGroup::ALL
            .iter()
            .filter_map(|group| {
                habits
                    .iter()
                    .filter(|h| group.contains(h.category) && h.difficulty <= cap)
                    .min_by_key(|h| (h.difficulty, h.id))
                    .cloned()
            })
            .collect()
    }

    /// Attach today's done flag; habits without a check-in today are not done
    pub fn attach_done(
        selection: Vec<HabitDefinition>,
        checkins: &[CheckinRecord],
        today: NaiveDate,
    ) -> Vec<PlannedHabit> {
        selection
            .into_iter()
            .map(|habit| {
                let done = checkins
                    .iter()
                    .rev()
                    .find(|c| c.date == today && c.habit_id == habit.id)
                    .map(|c| c.done)
                    .unwrap_or(false);
                PlannedHabit { habit, done }
            })
            .collect()
    }

    pub fn plan(
        tier: EnergyTier,
        habits: &[HabitDefinition],
        checkins: &[CheckinRecord],
        today: NaiveDate,
    ) -> DailyPlan {
        let selection = Self::select(tier, habits);
        DailyPlan {
            date: today,
            energy: tier,
            items: Self::attach_done(selection, checkins, today),
            message: tier.plan_message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn habit(id: i64, category: HabitCategory, difficulty: u8) -> HabitDefinition {
        HabitDefinition {
            id,
            name: format!("habit {}", id),
            icon: "✅".to_string(),
            category,
            difficulty,
        }
    }

    fn catalog() -> Vec<HabitDefinition> {
        vec![
            habit(1, HabitCategory::Nutrition, 2),
            habit(2, HabitCategory::Nutrition, 1),
            habit(3, HabitCategory::Movement, 3),
            habit(4, HabitCategory::Movement, 2),
            habit(5, HabitCategory::Lifestyle, 1),
            habit(6, HabitCategory::Hydration, 1),
            habit(7, HabitCategory::Other, 1),
        ]
    }

    fn ids(selection: &[HabitDefinition]) -> Vec<i64> {
        selection.iter().map(|h| h.id).collect()
    }

    #[test]
    fn test_low_energy_plan() {
        let selection = PlanSelector::select(EnergyTier::Low, &catalog());
        // No movement habit at difficulty 1; hydration/lifestyle tie broken by id
        assert_eq!(ids(&selection), vec![2, 5]);
    }

    #[test]
    fn test_high_energy_still_prefers_easy_habits() {
        let selection = PlanSelector::select(EnergyTier::High, &catalog());
        assert_eq!(ids(&selection), vec![2, 4, 5]);
    }

    #[test]
    fn test_empty_catalog() {
        assert!(PlanSelector::select(EnergyTier::High, &[]).is_empty());
    }

    #[test]
    fn test_attach_done() {
        let today = NaiveDate::from_ymd_opt(2024, 9, 23).unwrap();
        let checkins = vec![
            CheckinRecord { user_id: Uuid::nil(), habit_id: 2, date: today, done: true },
            CheckinRecord { user_id: Uuid::nil(), habit_id: 5, date: today.pred_opt().unwrap(), done: true },
        ];

        let plan = PlanSelector::plan(EnergyTier::Low, &catalog(), &checkins, today);
        assert_eq!(plan.energy, EnergyTier::Low);
        assert_eq!(plan.message, EnergyTier::Low.plan_message());
        assert!(plan.items[0].done);
        assert!(!plan.items[1].done);
    }

    fn arb_habit() -> impl Strategy<Value = HabitDefinition> {
        (
            1i64..50i64,
            prop_oneof![
                Just(HabitCategory::Nutrition),
                Just(HabitCategory::Movement),
                Just(HabitCategory::Hydration),
                Just(HabitCategory::Lifestyle),
                Just(HabitCategory::Other),
            ],
            1u8..=3u8,
        )
            .prop_map(|(id, category, difficulty)| habit(id, category, difficulty))
    }

    proptest! {
        #[test]
        fn test_selection_respects_cap_and_groups(
            habits in proptest::collection::vec(arb_habit(), 0..20),
            tier in prop_oneof![Just(EnergyTier::Low), Just(EnergyTier::Medium), Just(EnergyTier::High)],
        ) {
            let selection = PlanSelector::select(tier, &habits);
            prop_assert!(selection.len() <= 3);
            for group in CategoryGroup::ALL {
                let in_group = selection.iter().filter(|h| group.contains(h.category)).count();
                prop_assert!(in_group <= 1);
            }
            for h in &selection {
                prop_assert!(h.difficulty <= tier.difficulty_cap());
            }
        }

        #[test]
        fn test_selection_is_fixed_point(
            habits in proptest::collection::vec(arb_habit(), 0..20),
            tier in prop_oneof![Just(EnergyTier::Low), Just(EnergyTier::Medium), Just(EnergyTier::High)],
        ) {
            let selection = PlanSelector::select(tier, &habits);
            let again = PlanSelector::select(tier, &selection);
            prop_assert_eq!(selection, again);
        }
    }
}
