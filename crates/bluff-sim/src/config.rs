use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";
const MAX_PLAYERS: usize = 8;

/// Root simulation configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimConfig {
    pub run_id: String,
    pub table: TableConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub peeks: PeekConfig,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: SimConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.table.validate()?;
        self.timing.validate()?;
        self.peeks.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        self.logging.validate()?;
        Ok(())
    }

    /// Resolve output templates (`{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }
}

/// Table setup block: how many games to run and who sits down.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TableConfig {
    pub games: usize,
    pub players: usize,
    pub seed: Option<u64>,
}

impl TableConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.games == 0 {
            return Err(ValidationError::invalid(
                "table.games",
                "number of games must be greater than zero",
            ));
        }
        if self.players < 2 || self.players > MAX_PLAYERS {
            return Err(ValidationError::invalid(
                "table.players",
                format!("player count must be in 2..={MAX_PLAYERS}"),
            ));
        }
        Ok(())
    }
}

/// Timer configuration, in simulated seconds.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub turn_timer_secs: f32,
    pub tick_millis: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            turn_timer_secs: 5.0,
            tick_millis: 250,
        }
    }
}

impl TimingConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.turn_timer_secs.is_finite() || self.turn_timer_secs <= 0.0 {
            return Err(ValidationError::invalid(
                "timing.turn_timer_secs",
                "turn timer must be a positive number of seconds",
            ));
        }
        if self.tick_millis == 0 {
            return Err(ValidationError::invalid(
                "timing.tick_millis",
                "tick granularity must be at least one millisecond",
            ));
        }
        Ok(())
    }
}

/// Peek/deflect boundary configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PeekConfig {
    pub min_interval_secs: f32,
    pub max_interval_secs: f32,
    pub deflect_chance: f32,
    pub seat_cooldown_turns: u32,
    pub global_cooldown_turns: u32,
}

impl Default for PeekConfig {
    fn default() -> Self {
        Self {
            min_interval_secs: 10.0,
            max_interval_secs: 15.0,
            deflect_chance: 0.5,
            seat_cooldown_turns: 2,
            global_cooldown_turns: 1,
        }
    }
}

impl PeekConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.min_interval_secs.is_finite() || self.min_interval_secs <= 0.0 {
            return Err(ValidationError::invalid(
                "peeks.min_interval_secs",
                "peek interval must be a positive number of seconds",
            ));
        }
        if !self.max_interval_secs.is_finite() || self.max_interval_secs < self.min_interval_secs {
            return Err(ValidationError::invalid(
                "peeks.max_interval_secs",
                "maximum peek interval must be at least the minimum",
            ));
        }
        if !(0.0..=1.0).contains(&self.deflect_chance) {
            return Err(ValidationError::invalid(
                "peeks.deflect_chance",
                "deflect chance must be a probability in [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::invalid(label, "path must not be empty"));
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::invalid(label, "resolved path is invalid"));
            }
        }
        Ok(())
    }
}

/// Structured-logging block.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enable_structured: bool,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn normalize(&mut self) {
        self.level = self.level.trim().to_ascii_lowercase();
        if self.level.is_empty() {
            self.level = "info".to_string();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.level.as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.level().is_none() {
            return Err(ValidationError::invalid(
                "logging.level",
                format!("unknown log level '{}'", self.level),
            ));
        }
        Ok(())
    }
}

/// Output templates resolved against the run id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.is_empty() {
        return Err(ValidationError::invalid(
            "run_id",
            "run id must not be empty",
        ));
    }
    if let Some(bad) = run_id.chars().find(|c| !RUN_ID_ALLOWED.contains(*c)) {
        return Err(ValidationError::invalid(
            "run_id",
            format!("character '{bad}' is not allowed in a run id"),
        ));
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}: {source}")]
    Read {
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse configuration at {path}: {source}")]
    Parse {
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration at {path}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

impl ValidationError {
    fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}
