//! Engine settings
//!
//! Currency, status threshold, cadence and rollover preferences. Stored as
//! JSON; every field has a default so older files keep loading.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{BudgetError, BudgetResult};
use crate::models::{Cadence, Currency, RolloverPolicy, DEFAULT_WARNING_THRESHOLD};

/// Settings for the budget engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Currency of periods created through the services
    #[serde(default)]
    pub currency: Currency,

    /// Percentage used at which a category is flagged as a warning
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold_percent: f64,

    /// Length of consecutive periods
    #[serde(default)]
    pub cadence: Cadence,

    /// Day of the month monthly periods start on, e.g. a payday of the 31st
    #[serde(default)]
    pub monthly_anchor_day: Option<u32>,

    /// Policy used when no explicit choice is made
    #[serde(default)]
    pub default_rollover_policy: RolloverPolicy,

    /// Days before a period's end date when it is due for closing
    #[serde(default = "default_closing_lead_days")]
    pub closing_lead_days: u32,
}

fn default_warning_threshold() -> f64 {
    DEFAULT_WARNING_THRESHOLD
}

fn default_closing_lead_days() -> u32 {
    3
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            warning_threshold_percent: default_warning_threshold(),
            cadence: Cadence::default(),
            monthly_anchor_day: None,
            default_rollover_policy: RolloverPolicy::default(),
            closing_lead_days: default_closing_lead_days(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON and validate them
    pub fn from_json_str(contents: &str) -> BudgetResult<Self> {
        let settings: Settings = serde_json::from_str(contents)
            .map_err(|e| BudgetError::Config(format!("Failed to parse settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from disk, or use defaults if the file doesn't exist
    pub fn load_or_default(path: &Path) -> BudgetResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "settings file missing, using defaults");
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| BudgetError::Io(format!("Failed to read settings file: {}", e)))?;
        Self::from_json_str(&contents)
    }

    /// Save settings to disk
    pub fn save(&self, path: &Path) -> BudgetResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| BudgetError::Config(format!("Failed to serialize settings: {}", e)))?;
        std::fs::write(path, contents)
            .map_err(|e| BudgetError::Io(format!("Failed to write settings file: {}", e)))?;
        Ok(())
    }

    /// The warning threshold must lie in (0, 100] and an anchor day in 1..=31
    pub fn validate(&self) -> BudgetResult<()> {
        let threshold = self.warning_threshold_percent;
        if !(threshold > 0.0 && threshold <= 100.0) {
            return Err(BudgetError::Config(format!(
                "warning_threshold_percent must be in (0, 100], got {}",
                threshold
            )));
        }
        if let Some(day) = self.monthly_anchor_day {
            if !(1..=31).contains(&day) {
                return Err(BudgetError::Config(format!(
                    "monthly_anchor_day must be in 1..=31, got {}",
                    day
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.currency, Currency::USD);
        assert_eq!(settings.warning_threshold_percent, 90.0);
        assert_eq!(settings.cadence, Cadence::Monthly);
        assert_eq!(settings.default_rollover_policy, RolloverPolicy::Copy);
        assert_eq!(settings.closing_lead_days, 3);
        assert_eq!(settings.monthly_anchor_day, None);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_monthly_anchor_day() {
        let settings = Settings::from_json_str(r#"{"monthly_anchor_day": 31}"#).unwrap();
        assert_eq!(settings.monthly_anchor_day, Some(31));
        assert!(matches!(
            Settings::from_json_str(r#"{"monthly_anchor_day": 32}"#),
            Err(BudgetError::Config(_))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            Settings::from_json_str(r#"{"currency": "eur", "cadence": "bi_weekly"}"#).unwrap();
        assert_eq!(settings.currency, Currency::EUR);
        assert_eq!(settings.cadence, Cadence::BiWeekly);
        assert_eq!(settings.warning_threshold_percent, 90.0);
    }

    #[test]
    fn test_invalid_threshold() {
        let err = Settings::from_json_str(r#"{"warning_threshold_percent": 0}"#).unwrap_err();
        assert!(matches!(err, BudgetError::Config(_)));
        assert!(Settings::from_json_str(r#"{"warning_threshold_percent": 120.5}"#).is_err());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Settings::from_json_str("{not json"),
            Err(BudgetError::Config(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config").join("settings.json");

        let mut settings = Settings::default();
        settings.cadence = Cadence::Weekly;
        settings.default_rollover_policy = RolloverPolicy::Fresh;
        settings.save(&path).unwrap();

        let loaded = Settings::load_or_default(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = Settings::load_or_default(&temp_dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, Settings::default());
    }
}
