//! End-to-end tests: snapshot in, engine outputs out
//!
//! Builds a month of realistic history, replays check-ins through the engine
//! to fill the XP ledger, then checks every derived output.

use chrono::{Days, NaiveDate};
use rust_decimal_macros::dec;
use std::fs;
use tempfile::tempdir;
use uuid::Uuid;

use coachrs::coach::CoachRule;
use coachrs::garden::GrowthStage;
use coachrs::review::TipTag;
use coachrs::{
    CoachConfig, CoachEngine, DailyMetricRecord, EnergyTier, HabitCategory, HabitDefinition,
    UserSnapshot, WeighInRecord,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 30).unwrap()
}

fn days_ago(n: u64) -> NaiveDate {
    today() - Days::new(n)
}

fn habit(id: i64, category: HabitCategory, difficulty: u8) -> HabitDefinition {
    HabitDefinition {
        id,
        name: format!("habit {}", id),
        icon: "✅".to_string(),
        category,
        difficulty,
    }
}

/// Five perfect days ending today, a two-habit day before that, flat weight
fn consistent_user(engine: &CoachEngine) -> UserSnapshot {
    let user = Uuid::new_v4();
    let mut snapshot = UserSnapshot::new(user);

    snapshot.habits = vec![
        habit(1, HabitCategory::Nutrition, 1),
        habit(2, HabitCategory::Movement, 2),
        habit(3, HabitCategory::Hydration, 1),
        habit(4, HabitCategory::Movement, 3),
    ];

    let mut replay = vec![(days_ago(5), 1, true), (days_ago(5), 2, false), (days_ago(5), 3, true)];
    for n in (0..5).rev() {
        for id in 1..=3 {
            replay.push((days_ago(n), id, true));
        }
    }
    for (date, habit_id, done) in replay {
        let outcome = engine.record_checkin(&snapshot, habit_id, date, done).unwrap();
        snapshot.apply_checkin(outcome.checkin, outcome.awards);
    }

    snapshot.weigh_ins = (0..14)
        .rev()
        .map(|n| WeighInRecord {
            user_id: user,
            date: days_ago(n),
            kg: dec!(82.0),
        })
        .collect();

    snapshot.metrics = (0..7)
        .map(|n| DailyMetricRecord {
            steps: 10000,
            sleep_hours: Some(8.0),
            protein_g: Some(140),
            fiber_g: Some(30),
            water_ml: Some(2500),
            strength_min: 15,
            cardio_min: 30,
            ..DailyMetricRecord::empty(user, days_ago(n))
        })
        .collect();

    snapshot
}

#[test]
fn test_consistent_user_plan_and_garden() {
    let engine = CoachEngine::new();
    let snapshot = consistent_user(&engine);
    snapshot.validate().unwrap();

    // 17 of 18 rows done in the trailing week
    assert!((engine.completion_ratio(&snapshot, today()) - 17.0 / 18.0).abs() < 1e-12);
    assert_eq!(engine.energy(&snapshot, today()), EnergyTier::High);

    let plan = engine.plan_today(&snapshot, today());
    let ids: Vec<i64> = plan.items.iter().map(|item| item.habit.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(plan.items.iter().all(|item| item.done));

    let streaks = engine.streaks(&snapshot, today());
    assert_eq!(streaks.hard, 5);
    assert_eq!(streaks.soft, 6);

    let garden = engine.garden_state(&snapshot, today());
    assert_eq!(garden.stage, GrowthStage::Leafy);
    assert!(garden.watered_today);
    assert!(!garden.droopy);
}

#[test]
fn test_xp_ledger_from_replayed_checkins() {
    let engine = CoachEngine::new();
    let snapshot = consistent_user(&engine);

    // 2 x 10 on the first day, then 5 days of 3 x 10 + 25
    let status = engine.gamify_status(&snapshot);
    assert_eq!(status.total_xp, 295);
    assert_eq!(status.level, 2);
    assert_eq!(status.level_name, "Consistent");
    assert_eq!(status.next_level_xp, 300);
    assert_eq!(status.progress, 0.975);
}

#[test]
fn test_plateau_drives_review_coach_and_calories() {
    let engine = CoachEngine::new();
    let snapshot = consistent_user(&engine);

    let trend = engine.trend(&snapshot);
    assert_eq!(trend.len(), 14);
    assert!(trend.iter().all(|p| p.trend == dec!(82.00)));
    assert!(engine.plateau(&snapshot).plateau);

    let review = engine.weekly_review(&snapshot, today());
    assert!(review.plateau);
    assert_eq!(review.trend_delta_kg, Some(dec!(0.00)));
    assert_eq!(review.adherence.steps, 1.0);
    assert_eq!(review.adherence.protein, 1.0);
    assert_eq!(review.suggestions.len(), 1);
    assert!(review.suggestions[0].contains("plateau"));

    let message = engine.coach_message(&snapshot, today());
    assert_eq!(message.rule, CoachRule::Plateau);
    assert_eq!(message.actions.len(), 3);

    let adjustment = engine.adjust_calories(&snapshot, today());
    assert_eq!(adjustment.suggestion_kcal_delta, -100);

    let insights = engine.daily_insights(&snapshot, today());
    assert_eq!(insights.tip_tag, TipTag::Plateau);
    assert_eq!(insights.streak_soft, 6);
}

#[test]
fn test_targets_follow_latest_weigh_in() {
    let engine = CoachEngine::new();
    let snapshot = consistent_user(&engine);

    let targets = engine.daily_targets(&snapshot);
    // 1.6 * 82 = 131.2, 30 * 82 = 2460
    assert_eq!(targets.protein_g, 131);
    assert_eq!(targets.water_ml, 2460);
    assert_eq!(targets.fiber_g, 30);
}

#[test]
fn test_hydration_challenge() {
    let engine = CoachEngine::new();
    let snapshot = consistent_user(&engine);

    let progress = engine.challenge_progress(&snapshot, days_ago(6), today());
    assert_eq!(progress.day, 7);
    assert_eq!(progress.progress_days, 7);
    assert!(progress.is_complete());
}

#[test]
fn test_new_user_gets_low_energy_message() {
    let engine = CoachEngine::new();
    let snapshot = UserSnapshot::new(Uuid::new_v4());

    let message = engine.coach_message(&snapshot, today());
    assert_eq!(message.rule, CoachRule::LowEnergy);

    let review = engine.weekly_review(&snapshot, today());
    assert!(!review.plateau);
    assert_eq!(review.trend_delta_kg, None);
    assert!(!review.suggestions.is_empty());

    let adjustment = engine.adjust_calories(&snapshot, today());
    assert_eq!(adjustment.suggestion_kcal_delta, 0);
}

#[test]
fn test_snapshot_file_round_trip() {
    let engine = CoachEngine::new();
    let snapshot = consistent_user(&engine);

    let dir = tempdir().unwrap();
    let path = dir.path().join("history.json");
    fs::write(&path, serde_json::to_string_pretty(&snapshot).unwrap()).unwrap();

    let loaded = UserSnapshot::load_from_file(&path).unwrap();
    assert_eq!(loaded, snapshot);
    assert_eq!(
        engine.garden_state(&loaded, today()),
        engine.garden_state(&snapshot, today())
    );
}

#[test]
fn test_config_file_changes_engine_behaviour() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = CoachConfig::default();
    config.streak.perfect_day_threshold = 4;
    config.save_to_file(&path).unwrap();

    let loaded = CoachConfig::load_from_file(&path).unwrap();
    let strict = CoachEngine::with_config(loaded);
    let snapshot = consistent_user(&CoachEngine::new());

    // Three done check-ins a day no longer count as perfect
    assert_eq!(strict.streaks(&snapshot, today()).hard, 0);
    assert!(strict.garden_state(&snapshot, today()).droopy);
}
