use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::challenge::ChallengeConfig;
use crate::coach::CoachThresholds;
use crate::energy::EnergyConfig;
use crate::error::CoachError;
use crate::leveling::XpConfig;
use crate::nutrition::TargetConfig;
use crate::plateau::PlateauConfig;
use crate::review::ReviewConfig;
use crate::streak::StreakConfig;
use crate::trend::TrendConfig;

/// Engine configuration
///
/// Every section falls back to its defaults when missing from the file, so a
/// config only needs to list the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachConfig {
    /// Configuration metadata
    pub metadata: ConfigMetadata,

    /// Weight trend smoothing
    pub trend: TrendConfig,

    /// Plateau detection window and slope threshold
    pub plateau: PlateauConfig,

    /// Energy tier thresholds
    pub energy: EnergyConfig,

    /// Perfect-day streak thresholds
    pub streak: StreakConfig,

    /// XP awards and level names
    pub xp: XpConfig,

    /// Daily activity and nutrition goals
    pub targets: TargetConfig,

    /// Weekly review window and suggestion gate
    pub review: ReviewConfig,

    /// Coach message thresholds
    pub coach: CoachThresholds,

    /// Hydration challenge settings
    pub challenge: ChallengeConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        let now = Utc::now();
        ConfigMetadata {
            version: "1.0".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for CoachConfig {
    fn default() -> Self {
        CoachConfig {
            metadata: ConfigMetadata::default(),
            trend: TrendConfig::default(),
            plateau: PlateauConfig::default(),
            energy: EnergyConfig::default(),
            streak: StreakConfig::default(),
            xp: XpConfig::default(),
            targets: TargetConfig::default(),
            review: ReviewConfig::default(),
            coach: CoachThresholds::default(),
            challenge: ChallengeConfig::default(),
        }
    }
}

impl CoachConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: CoachConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".coachrs")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!("Using default configuration ({}): {:#}", config_path.display(), err);
                Self::default()
            }
        }
    }

    /// Save configuration to default location
    pub fn save_default(&mut self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to_file(config_path)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> crate::error::Result<()> {
        let alpha = self.trend.alpha;
        if alpha <= Decimal::ZERO || alpha > Decimal::ONE {
            return Err(CoachError::Configuration(format!(
                "trend.alpha must be in (0, 1], got {}",
                alpha
            )));
        }

        if self.plateau.min_samples < 2 || self.plateau.window < self.plateau.min_samples {
            return Err(CoachError::Configuration(format!(
                "plateau window {} must hold at least min_samples {} (>= 2)",
                self.plateau.window, self.plateau.min_samples
            )));
        }

        if self.energy.medium_threshold > self.energy.high_threshold {
            return Err(CoachError::Configuration(
                "energy.medium_threshold must not exceed energy.high_threshold".to_string(),
            ));
        }

        if self.energy.window_days == 0 || self.review.window_days == 0 {
            return Err(CoachError::Configuration(
                "window_days must be at least 1".to_string(),
            ));
        }

        if self.xp.level_names.is_empty() {
            return Err(CoachError::Configuration(
                "xp.level_names must not be empty".to_string(),
            ));
        }

        if self.challenge.duration_days == 0 {
            return Err(CoachError::Configuration(
                "challenge.duration_days must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[test]
    fn test_config_serialization() {
        let config = CoachConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: CoachConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.metadata.version, deserialized.metadata.version);
        assert_eq!(config.trend.alpha, deserialized.trend.alpha);
        assert_eq!(config.xp.level_names, deserialized.xp.level_names);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: CoachConfig = toml::from_str(
            r#"
            [targets]
            steps = 10000
            sleep_hours = 8.0
            strength_min_week = 60
            cardio_min_week_min = 150
            cardio_min_week_max = 300
            fallback_weight_kg = 70.0
            "#,
        )
        .unwrap();

        assert_eq!(config.targets.steps, 10000);
        assert_eq!(config.plateau, PlateauConfig::default());
        assert_eq!(config.trend.alpha, dec!(0.3));
    }

    #[test]
    fn test_validation() {
        assert!(CoachConfig::default().validate().is_ok());

        let mut config = CoachConfig::default();
        config.trend.alpha = dec!(0);
        assert!(matches!(config.validate(), Err(CoachError::Configuration(_))));

        let mut config = CoachConfig::default();
        config.plateau.window = 3;
        assert!(config.validate().is_err());

        let mut config = CoachConfig::default();
        config.xp.level_names.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original_config = CoachConfig::default();
        original_config.streak.perfect_day_threshold = 4;

        original_config.save_to_file(&config_path).unwrap();
        let loaded_config = CoachConfig::load_from_file(&config_path).unwrap();

        assert_eq!(loaded_config.streak.perfect_day_threshold, 4);
        assert_eq!(loaded_config.challenge, original_config.challenge);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[trend]\nalpha = \"1.5\"\n").unwrap();

        assert!(CoachConfig::load_from_file(&config_path).is_err());
    }
}
