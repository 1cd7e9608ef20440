//! `config.toml` loading for the analysis driver.

use serde::Deserialize;
use std::path::Path;

use crate::breakout::BreakoutConfig;
use crate::logging::{LogRotation, LoggingConfig};
use crate::volume_profile::VolumeProfileConfig;

/// Logging section as written in config.toml
#[derive(Debug, Clone, Default, Deserialize)]
struct LoggingTomlConfig {
    pub log_dir: Option<String>,
    pub level_filter: Option<String>,
    pub rotation: Option<String>, // "daily", "hourly", or "size:<MB>"
    pub console_timestamps: Option<bool>,
    pub file_json_format: Option<bool>,
    pub cleanup_days: Option<u32>,
}

impl LoggingTomlConfig {
    fn into_logging_config(self) -> LoggingConfig {
        let defaults = LoggingConfig::default();
        LoggingConfig {
            log_dir: self.log_dir.unwrap_or(defaults.log_dir),
            level_filter: self.level_filter.unwrap_or(defaults.level_filter),
            rotation: self
                .rotation
                .map(|r| LogRotation::from_config_str(&r))
                .unwrap_or(defaults.rotation),
            console_timestamps: self.console_timestamps.unwrap_or(defaults.console_timestamps),
            file_json_format: self.file_json_format.unwrap_or(defaults.file_json_format),
            cleanup_days: self.cleanup_days.unwrap_or(defaults.cleanup_days),
        }
    }
}

/// Full TOML configuration structure; every section is optional
#[derive(Debug, Clone, Default, Deserialize)]
struct TomlConfig {
    pub volume_profile: Option<VolumeProfileConfig>,
    pub breakout: Option<BreakoutConfig>,
    pub logging: Option<LoggingTomlConfig>,
}

/// Driver configuration (converted from TOML)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsConfig {
    pub volume_profile: VolumeProfileConfig,
    pub breakout: BreakoutConfig,
    pub logging: LoggingConfig,
}

impl AnalyticsConfig {
    /// Load configuration from a config.toml file
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let config_content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&config_content)
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let toml_config: TomlConfig = toml::from_str(content)?;
        let config = Self::from_toml_config(toml_config);
        config.validate()?;
        Ok(config)
    }

    fn from_toml_config(toml_config: TomlConfig) -> Self {
        Self {
            volume_profile: toml_config.volume_profile.unwrap_or_default(),
            breakout: toml_config.breakout.unwrap_or_default(),
            logging: toml_config
                .logging
                .map(LoggingTomlConfig::into_logging_config)
                .unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.volume_profile.validate()?;
        self.breakout.validate()?;
        Ok(())
    }
}
