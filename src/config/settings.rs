//! User settings for audit-trail
//!
//! Persisted preferences controlling how relation changes are joined, how
//! much history the `history` command shows, and the default log level.

use serde::{Deserialize, Serialize};

use super::paths::AuditPaths;
use crate::error::AuditError;

/// Settings for audit-trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Delimiter used to join added/removed relation values
    #[serde(default = "default_delimiter")]
    pub multi_value_delimiter: String,

    /// Number of trails returned when listing an entity's history
    #[serde(default = "default_recent_trail_limit")]
    pub recent_trail_limit: usize,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Default log level when `--verbose` is not given
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_delimiter() -> String {
    ", ".to_string()
}

fn default_recent_trail_limit() -> usize {
    7
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            multi_value_delimiter: default_delimiter(),
            recent_trail_limit: default_recent_trail_limit(),
            date_format: default_date_format(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &AuditPaths) -> Result<Self, AuditError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| AuditError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| AuditError::Configuration(format!("Failed to parse settings file: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &AuditPaths) -> Result<(), AuditError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AuditError::Configuration(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| AuditError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Reject settings the recorder cannot work with
    pub fn validate(&self) -> Result<(), AuditError> {
        if self.recent_trail_limit == 0 {
            return Err(AuditError::Configuration(
                "recent_trail_limit must be at least 1".into(),
            ));
        }

        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(AuditError::Configuration(format!(
                "Unknown log level '{}'",
                self.log_level
            )));
        }

        Ok(())
    }
}
