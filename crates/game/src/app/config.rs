use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub(crate) const LEVEL_ENV_VAR: &str = "QUIZRUN_LEVEL";
pub(crate) const SEED_ENV_VAR: &str = "QUIZRUN_SEED";
pub(crate) const MAX_TICKS_ENV_VAR: &str = "QUIZRUN_MAX_TICKS";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read game config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse game config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("parse game config {path} at {at}: {source}")]
    ParseAt {
        path: PathBuf,
        at: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("environment variable {var} has invalid value '{value}'")]
    InvalidEnv { var: &'static str, value: String },
}

/// Movement and health tuning for the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PlayerTuning {
    pub(crate) max_health: u32,
    pub(crate) speed: f32,
    pub(crate) jump_force: f32,
    /// Ground deceleration in px/s² applied when no direction is held.
    pub(crate) friction: f32,
    pub(crate) invincibility_ms: f32,
    pub(crate) blink_half_cycle_ms: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 3,
            speed: 160.0,
            jump_force: 330.0,
            friction: 2400.0,
            invincibility_ms: 3000.0,
            blink_half_cycle_ms: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) player: PlayerTuning,
    pub(crate) gravity: f32,
    pub(crate) level: String,
    pub(crate) question_bank: String,
    /// Category used for enemies that do not name one.
    pub(crate) quiz_category: Option<String>,
    pub(crate) seed: u64,
    pub(crate) target_tps: u32,
    pub(crate) max_ticks: Option<u64>,
    pub(crate) realtime: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player: PlayerTuning::default(),
            gravity: 600.0,
            level: "stage1".to_string(),
            question_bank: "questions".to_string(),
            quiz_category: None,
            seed: 0x5eed,
            target_tps: 60,
            max_ticks: None,
            realtime: false,
        }
    }
}

impl GameConfig {
    /// Reads `path` if it exists, otherwise returns the built-in defaults.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            info!(path = %path.display(), "game_config_defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(path, &raw)?;
        info!(path = %path.display(), level = %config.level, "game_config_loaded");
        Ok(config)
    }

    fn parse(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        match serde_path_to_error::deserialize::<_, Self>(&mut deserializer) {
            Ok(config) => Ok(config),
            Err(error) => {
                let at = error.path().to_string();
                let source = error.into_inner();
                if at.is_empty() || at == "." {
                    Err(ConfigError::Parse {
                        path: path.to_path_buf(),
                        source,
                    })
                } else {
                    Err(ConfigError::ParseAt {
                        path: path.to_path_buf(),
                        at,
                        source,
                    })
                }
            }
        }
    }

    pub(crate) fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|var| std::env::var(var).ok())
    }

    fn apply_overrides_from(
        &mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(level) = lookup(LEVEL_ENV_VAR) {
            let level = level.trim();
            if level.is_empty() {
                return Err(ConfigError::InvalidEnv {
                    var: LEVEL_ENV_VAR,
                    value: level.to_string(),
                });
            }
            self.level = level.to_string();
        }
        if let Some(raw) = lookup(SEED_ENV_VAR) {
            self.seed = parse_env_number(SEED_ENV_VAR, &raw)?;
        }
        if let Some(raw) = lookup(MAX_TICKS_ENV_VAR) {
            self.max_ticks = Some(parse_env_number(MAX_TICKS_ENV_VAR, &raw)?);
        }
        Ok(())
    }
}

fn parse_env_number(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidEnv {
            var,
            value: raw.to_string(),
        })
}
