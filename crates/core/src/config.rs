use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub timers: TimerConfig,
    pub branch: BranchConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimerConfig {
    /// T1: seconds of silence before the reminder fires.
    pub reminder_secs: u64,
    /// T2: further seconds of silence before the conversation is canceled.
    pub cancellation_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BranchConfig {
    pub delivery_fee: Decimal,
    pub hours: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub reminder_secs: Option<u64>,
    pub cancellation_secs: Option<u64>,
    pub delivery_fee: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timers: TimerConfig { reminder_secs: 180, cancellation_secs: 300 },
            branch: BranchConfig {
                delivery_fee: Decimal::ZERO,
                hours: "lunes a sábado, 9:00–18:00".to_string(),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl TimerConfig {
    pub fn reminder_interval(&self) -> Duration {
        Duration::from_secs(self.reminder_secs)
    }

    pub fn cancellation_interval(&self) -> Duration {
        Duration::from_secs(self.cancellation_secs)
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("ordena.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides)?;
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(timers) = patch.timers {
            if let Some(reminder_secs) = timers.reminder_secs {
                self.timers.reminder_secs = reminder_secs;
            }
            if let Some(cancellation_secs) = timers.cancellation_secs {
                self.timers.cancellation_secs = cancellation_secs;
            }
        }

        if let Some(branch) = patch.branch {
            if let Some(delivery_fee) = branch.delivery_fee {
                self.branch.delivery_fee = parse_fee("branch.delivery_fee", &delivery_fee)?;
            }
            if let Some(hours) = branch.hours {
                self.branch.hours = hours;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("ORDENA_REMINDER_SECS") {
            self.timers.reminder_secs = parse_u64("ORDENA_REMINDER_SECS", &value)?;
        }
        if let Some(value) = read_env("ORDENA_CANCELLATION_SECS") {
            self.timers.cancellation_secs = parse_u64("ORDENA_CANCELLATION_SECS", &value)?;
        }
        if let Some(value) = read_env("ORDENA_DELIVERY_FEE") {
            self.branch.delivery_fee = parse_fee("ORDENA_DELIVERY_FEE", &value)?;
        }
        if let Some(value) = read_env("ORDENA_BRANCH_HOURS") {
            self.branch.hours = value;
        }
        if let Some(value) = read_env("ORDENA_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = read_env("ORDENA_LOG_FORMAT") {
            self.logging.format = value.parse()?;
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) -> Result<(), ConfigError> {
        if let Some(reminder_secs) = overrides.reminder_secs {
            self.timers.reminder_secs = reminder_secs;
        }
        if let Some(cancellation_secs) = overrides.cancellation_secs {
            self.timers.cancellation_secs = cancellation_secs;
        }
        if let Some(delivery_fee) = overrides.delivery_fee {
            self.branch.delivery_fee = parse_fee("overrides.delivery_fee", &delivery_fee)?;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timers.reminder_secs == 0 {
            return Err(ConfigError::Validation(
                "timers.reminder_secs must be greater than zero".to_string(),
            ));
        }
        if self.timers.cancellation_secs == 0 {
            return Err(ConfigError::Validation(
                "timers.cancellation_secs must be greater than zero".to_string(),
            ));
        }
        if self.branch.delivery_fee < Decimal::ZERO {
            return Err(ConfigError::Validation(
                "branch.delivery_fee must not be negative".to_string(),
            ));
        }

        let level = self.logging.level.trim().to_ascii_lowercase();
        match level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::Validation(
                "logging.level must be one of trace|debug|info|warn|error".to_string(),
            )),
        }
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("ordena.toml"), PathBuf::from("config/ordena.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_fee(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    value.trim().parse::<Decimal>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    timers: Option<TimersPatch>,
    branch: Option<BranchPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct TimersPatch {
    reminder_secs: Option<u64>,
    cancellation_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct BranchPatch {
    delivery_fee: Option<String>,
    hours: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
