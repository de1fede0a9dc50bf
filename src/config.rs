//! Configuration loaded from `config.toml` in the data directory
//!
//! ```toml
//! data_dir = "/home/me/vocab"      # optional
//! log_level = "info"               # optional
//!
//! [session]
//! amount = 10
//! exercise_type = "both"           # guess-only | write-only | both
//! feedback_delay_ms = 600
//!
//! [scheduler]
//! default_alpha = 0.2
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vocabulary::session::DEFAULT_SESSION_AMOUNT;
use crate::vocabulary::{is_valid_alpha, ExerciseType, SessionParams, DEFAULT_ALPHA};

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    pub session: SessionConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub amount: usize,
    pub exercise_type: ExerciseType,
    /// Pause after grading before the answer can be acknowledged
    pub feedback_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            amount: DEFAULT_SESSION_AMOUNT,
            exercise_type: ExerciseType::Both,
            feedback_delay_ms: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Smoothing factor given to newly added words
    pub default_alpha: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_alpha: DEFAULT_ALPHA,
        }
    }
}

impl Config {
    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE_NAME)
    }

    /// Load from `path`; a missing file gives the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.session.amount == 0 {
            return Err(ConfigError::Invalid("session.amount must be at least 1".to_string()));
        }
        if self.session.feedback_delay_ms == 0 {
            return Err(ConfigError::Invalid(
                "session.feedback_delay_ms must be at least 1".to_string(),
            ));
        }
        let alpha = self.scheduler.default_alpha;
        if !is_valid_alpha(alpha) {
            return Err(ConfigError::Invalid(format!(
                "scheduler.default_alpha must be in (0, 1], got {}",
                alpha
            )));
        }
        Ok(())
    }

    pub fn session_params(&self) -> SessionParams {
        SessionParams {
            amount: self.session.amount,
            exercise_type: self.session.exercise_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(&Config::path_in(temp_dir.path())).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.session_params(), SessionParams::default());
    }

    #[test]
    fn test_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = Config::path_in(temp_dir.path());
        fs::write(&path, "[session]\namount = 25\nexercise_type = \"write-only\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.session.amount, 25);
        assert_eq!(config.session.exercise_type, ExerciseType::WriteOnly);
        assert_eq!(config.session.feedback_delay_ms, 600);
        assert_eq!(config.scheduler.default_alpha, DEFAULT_ALPHA);
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = Config::path_in(&temp_dir.path().join("nested"));

        let mut config = Config::default();
        config.log_level = Some("debug".to_string());
        config.scheduler.default_alpha = 0.35;
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = Config::path_in(temp_dir.path());

        fs::write(&path, "[session]\namount = 0\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Invalid(_))));

        fs::write(&path, "[session]\nfeedback_delay_ms = 0\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.session.feedback_delay_ms = 0;
        assert!(matches!(config.save(&path), Err(ConfigError::Invalid(_))));

        fs::write(&path, "[scheduler]\ndefault_alpha = 1.5\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Invalid(_))));

        fs::write(&path, "[session]\nexercise_type = \"sideways\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }
}
