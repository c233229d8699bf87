use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::*;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use coachrs::coach::CoachRule;
use coachrs::logging::{init_logging, LogConfig, LogLevel};
use coachrs::nutrition::{EstimateRequest, MacroSplitRequest};
use coachrs::trend::TrendSmoother;
use coachrs::{CoachConfig, CoachEngine, EnergyTier, HabitId, Sex, UserSnapshot};

/// coachrs - Adaptive habit and nutrition coaching
///
/// Derives today's habit plan, streaks, garden state, leveling, nutrition
/// targets and coaching messages from a user's history snapshot.
#[derive(Parser)]
#[command(name = "coachrs")]
#[command(version)]
#[command(about = "Adaptive coaching decision engine", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// User history snapshot (JSON)
    #[arg(short, long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Evaluate as of this date (YYYY-MM-DD, default: local today)
    #[arg(short, long, value_name = "DATE")]
    today: Option<NaiveDate>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Smoothed weight trend
    Trend {
        /// Override the smoothing factor, in (0, 1]
        #[arg(short, long)]
        alpha: Option<Decimal>,
    },

    /// Today's habit plan
    Plan,

    /// Garden growth state
    Garden,

    /// Daily insights (energy, soft streak, plateau, tip)
    Insights,

    /// Weekly review with adherence and suggestions
    Review,

    /// Single prioritized coach message
    Coach,

    /// XP level and progress
    Level,

    /// Calorie and nutrient targets
    Estimate {
        #[arg(long)]
        sex: Sex,

        #[arg(long)]
        age: u32,

        /// Height in cm
        #[arg(long)]
        height: f64,

        /// Weight in kg
        #[arg(long)]
        weight: f64,

        /// TDEE multiplier
        #[arg(long, default_value = "1.4")]
        activity: f64,

        /// Fraction of TDEE to cut
        #[arg(long, default_value = "0.18")]
        deficit: f64,
    },

    /// Macro split for a calorie target
    Macros {
        #[arg(long)]
        kcal: u32,

        /// Protein target in grams
        #[arg(long)]
        protein: u32,

        /// Share of calories from fat
        #[arg(long, default_value = "0.30")]
        fat_percent: f64,
    },

    /// Calorie adjustment suggestion
    AdjustCalories,

    /// Hydration challenge progress
    Challenge {
        /// Challenge start date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
    },

    /// Trailing seven days of metrics
    Week,

    /// Record a check-in and write it back to the snapshot
    Checkin {
        habit: HabitId,

        /// Mark the habit as not done
        #[arg(long)]
        undo: bool,

        /// Compute the outcome without saving
        #[arg(long)]
        dry_run: bool,
    },

    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Tabled)]
struct TrendRow {
    date: NaiveDate,
    weight: Decimal,
    trend: Decimal,
}

#[derive(Tabled)]
struct PlanRow {
    habit: String,
    category: String,
    difficulty: u8,
    done: String,
}

#[derive(Tabled)]
struct WeekRow {
    date: NaiveDate,
    steps: u32,
    sleep: String,
    protein: String,
    water: String,
}

fn or_dash<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn tier_label(tier: EnergyTier) -> ColoredString {
    match tier {
        EnergyTier::Low => tier.to_string().red(),
        EnergyTier::Medium => tier.to_string().yellow(),
        EnergyTier::High => tier.to_string().green(),
    }
}

fn load_config(path: Option<&Path>) -> Result<CoachConfig> {
    match path {
        Some(path) => CoachConfig::load_from_file(path),
        None => Ok(CoachConfig::load_or_default()),
    }
}

fn load_snapshot(path: Option<&Path>) -> Result<UserSnapshot> {
    let path = path.context("This command needs --snapshot <FILE>")?;
    UserSnapshot::load_from_file(path).map_err(|err| anyhow::anyhow!(err.user_message()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig {
        level: LogLevel::from_verbosity(cli.verbose),
        ..LogConfig::default()
    };
    init_logging(&log_config)?;

    if let Commands::InitConfig { force } = cli.command {
        let path = cli.config.unwrap_or_else(CoachConfig::default_config_path);
        if path.exists() && !force {
            bail!("{} already exists (use --force to overwrite)", path.display());
        }
        let mut config = CoachConfig::default();
        config.save_to_file(&path)?;
        println!("{} {}", "✓ Configuration written to".green(), path.display());
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;
    let engine = CoachEngine::with_config(config);
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let snapshot_path = cli.snapshot.as_deref();

    match cli.command {
        Commands::Trend { alpha } => {
            let snapshot = load_snapshot(snapshot_path)?;
            let points = match alpha {
                Some(alpha) => {
                    if alpha <= Decimal::ZERO || alpha > Decimal::ONE {
                        bail!("--alpha must be in (0, 1], got {}", alpha);
                    }
                    TrendSmoother::with_alpha(alpha).smooth(&snapshot.weigh_ins)
                }
                None => engine.trend(&snapshot),
            };

            if cli.json {
                return print_json(&points);
            }
            if points.is_empty() {
                println!("{}", "No weigh-ins yet".dimmed());
                return Ok(());
            }

            let rows: Vec<TrendRow> = points
                .iter()
                .map(|p| TrendRow { date: p.date, weight: p.weight, trend: p.trend })
                .collect();
            println!("{}", "Weight trend".cyan().bold());
            println!("{}", Table::new(rows).with(Style::rounded()));

            let plateau = engine.plateau(&snapshot);
            if plateau.plateau {
                println!("{}", "⚠ Plateau detected".yellow());
            }
        }

        Commands::Plan => {
            let snapshot = load_snapshot(snapshot_path)?;
            let plan = engine.plan_today(&snapshot, today);

            if cli.json {
                return print_json(&plan);
            }

            println!("{} {} ({})", "Plan for".green().bold(), plan.date, tier_label(plan.energy));
            let rows: Vec<PlanRow> = plan
                .items
                .iter()
                .map(|item| PlanRow {
                    habit: format!("{} {}", item.habit.icon, item.habit.name),
                    category: item.habit.category.to_string(),
                    difficulty: item.habit.difficulty,
                    done: if item.done { "✓".to_string() } else { String::new() },
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
            println!("{}", plan.message.italic());
        }

        Commands::Garden => {
            let snapshot = load_snapshot(snapshot_path)?;
            let garden = engine.garden_state(&snapshot, today);

            if cli.json {
                return print_json(&garden);
            }

            println!("{} {}", "Garden:".green().bold(), garden.stage);
            println!("  Perfect streak: {}", garden.perfect_streak);
            println!("  Watered today:  {}", if garden.watered_today { "yes" } else { "no" });
            if garden.droopy {
                println!("  {}", "Your plant looks droopy".yellow());
            }
            println!("  {}", garden.hint.dimmed());
        }

        Commands::Insights => {
            let snapshot = load_snapshot(snapshot_path)?;
            let insights = engine.daily_insights(&snapshot, today);

            if cli.json {
                return print_json(&insights);
            }

            println!("{}", "Daily insights".cyan().bold());
            println!("  Energy:          {}", tier_label(insights.energy));
            println!("  7-day adherence: {:.1}%", insights.completion_ratio_7d * 100.0);
            println!("  Soft streak:     {}", insights.streak_soft);
            println!("  Plateau:         {}", if insights.plateau { "yes" } else { "no" });
            println!("  Tip:             {}", insights.tip);
        }

        Commands::Review => {
            let snapshot = load_snapshot(snapshot_path)?;
            let review = engine.weekly_review(&snapshot, today);

            if cli.json {
                return print_json(&review);
            }

            println!("{} {} → {}", "Weekly review".blue().bold(), review.start, review.end);
            let a = &review.adherence;
            for (label, value) in [
                ("steps", a.steps),
                ("sleep", a.sleep),
                ("protein", a.protein),
                ("fiber", a.fiber),
                ("water", a.water),
                ("strength", a.strength),
                ("cardio", a.cardio),
            ] {
                let pct = format!("{:>5.1}%", value * 100.0);
                let pct = if value >= 0.8 { pct.green() } else { pct.red() };
                println!("  {:<9} {}", label, pct);
            }
            if let Some(delta) = review.trend_delta_kg {
                println!("  Trend change: {} kg", delta);
            }
            if review.plateau {
                println!("  {}", "Plateau detected".yellow());
            }
            println!("{}", "Suggestions".bold());
            for suggestion in &review.suggestions {
                println!("  • {}", suggestion);
            }
        }

        Commands::Coach => {
            let snapshot = load_snapshot(snapshot_path)?;
            let message = engine.coach_message(&snapshot, today);

            if cli.json {
                return print_json(&message);
            }

            let title = match message.rule {
                CoachRule::Plateau | CoachRule::LowEnergy => message.title.yellow().bold(),
                CoachRule::Encouragement => message.title.green().bold(),
                _ => message.title.cyan().bold(),
            };
            println!("{}", title);
            println!("{}", message.message);
            for action in &message.actions {
                println!("  → {}", action);
            }
        }

        Commands::Level => {
            let snapshot = load_snapshot(snapshot_path)?;
            let status = engine.gamify_status(&snapshot);

            if cli.json {
                return print_json(&status);
            }

            println!(
                "{} {} ({})",
                "Level".magenta().bold(),
                status.level,
                status.level_name
            );
            println!("  XP: {} / {}", status.total_xp, status.next_level_xp);
            println!("  Progress: {:.1}%", status.progress * 100.0);
        }

        Commands::Estimate { sex, age, height, weight, activity, deficit } => {
            if height <= 0.0 || weight <= 0.0 {
                bail!("height and weight must be positive");
            }
            let request = EstimateRequest {
                activity_factor: activity,
                deficit_percent: deficit,
                ..EstimateRequest::new(sex, age, height, weight)
            };
            let estimate = engine.estimate(&request);

            if cli.json {
                return print_json(&estimate);
            }

            println!("{}", "Nutrition estimate".green().bold());
            println!("  BMR:      {:.0} kcal", estimate.bmr);
            println!("  TDEE:     {:.0} kcal", estimate.tdee);
            println!("  Target:   {} kcal", estimate.calorie_target.to_string().bold());
            println!("  Protein:  {} g", estimate.protein_target_g);
            println!("  Water:    {} ml", estimate.water_target_ml);
            println!("  Fiber:    {} g", estimate.fiber_target_g);
            for note in &estimate.notes {
                println!("  {}", note.dimmed());
            }
        }

        Commands::Macros { kcal, protein, fat_percent } => {
            if !(0.0..=1.0).contains(&fat_percent) {
                bail!("--fat-percent must be between 0 and 1");
            }
            let split = engine.macro_split(&MacroSplitRequest {
                calorie_target: kcal,
                protein_target_g: protein,
                fat_percent,
            });

            if cli.json {
                return print_json(&split);
            }

            println!("{} {} kcal", "Macro split".green().bold(), split.kcal);
            println!("  Protein: {} g", split.protein_g);
            println!("  Carbs:   {} g", split.carbs_g);
            println!("  Fat:     {} g", split.fat_g);
            for note in &split.notes {
                println!("  {}", note.yellow());
            }
        }

        Commands::AdjustCalories => {
            let snapshot = load_snapshot(snapshot_path)?;
            let adjustment = engine.adjust_calories(&snapshot, today);

            if cli.json {
                return print_json(&adjustment);
            }

            println!(
                "{} {:+} kcal",
                "Calorie adjustment:".blue().bold(),
                adjustment.suggestion_kcal_delta
            );
            println!("  {}", adjustment.reason);
        }

        Commands::Challenge { start } => {
            let snapshot = load_snapshot(snapshot_path)?;
            let progress = engine.challenge_progress(&snapshot, start, today);

            if cli.json {
                return print_json(&progress);
            }

            println!("{} ({})", progress.title.cyan().bold(), progress.code);
            println!("  Day {} of {}", progress.day, progress.duration_days);
            println!(
                "  {} / {} days at {} {}",
                progress.progress_days, progress.duration_days, progress.target_daily, progress.unit
            );
            if progress.is_complete() {
                println!("  {}", "✓ Challenge complete".green());
            }
        }

        Commands::Week => {
            let snapshot = load_snapshot(snapshot_path)?;
            let series = engine.week_series(&snapshot, today);

            if cli.json {
                return print_json(&series);
            }

            let rows: Vec<WeekRow> = series
                .iter()
                .map(|day| WeekRow {
                    date: day.date,
                    steps: day.steps,
                    sleep: or_dash(day.sleep_hours),
                    protein: or_dash(day.protein_g),
                    water: or_dash(day.water_ml),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }

        Commands::Checkin { habit, undo, dry_run } => {
            let path = snapshot_path.context("This command needs --snapshot <FILE>")?;
            let mut snapshot = load_snapshot(Some(path))?;
            let outcome = engine.record_checkin(&snapshot, habit, today, !undo)?;

            if cli.json {
                print_json(&outcome)?;
            } else {
                let state = if outcome.checkin.done { "done".green() } else { "not done".yellow() };
                println!("Habit {} marked {} on {}", habit, state, outcome.checkin.date);
                for award in &outcome.awards {
                    println!("  {} XP ({})", format!("+{}", award.amount).magenta(), award.reason);
                }
            }

            if !dry_run {
                snapshot.apply_checkin(outcome.checkin, outcome.awards);
                let json = serde_json::to_string_pretty(&snapshot)?;
                fs::write(path, json)
                    .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;
            }
        }

        Commands::InitConfig { .. } => {}
    }

    Ok(())
}
