//! Dispatcher configuration and the environment variables that override it.

use std::str::FromStr;

use tokio::time::Duration;

use crate::level::Level;
use crate::record::LogFormat;
use crate::sink::SinkKind;

/// `true` enables events carrying the cache marker.
pub const EVENT_LOG_CACHE_EVENTS_ENV: &str = "EVENT_LOG_CACHE_EVENTS";

/// Minimum level for console sinks.
pub const EVENT_LOG_CONSOLE_LEVEL_ENV: &str = "EVENT_LOG_CONSOLE_LEVEL";

/// Minimum level for file sinks.
pub const EVENT_LOG_FILE_LEVEL_ENV: &str = "EVENT_LOG_FILE_LEVEL";

/// `text` or `json`.
pub const EVENT_LOG_FORMAT_ENV: &str = "EVENT_LOG_FORMAT";

/// Comma-separated sink specs, e.g. `stdout,file:///var/log/tool.log`.
pub const EVENT_LOG_SINKS_ENV: &str = "EVENT_LOG_SINKS";

pub const EVENT_LOG_BATCH_SIZE_ENV: &str = "EVENT_LOG_BATCH_SIZE";

pub const EVENT_LOG_CHANNEL_BUFFER_ENV: &str = "EVENT_LOG_CHANNEL_BUFFER";

/// Error returned when a configuration value cannot be parsed.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Configuration of the event dispatcher.
///
/// **Fields**
/// - `channel_buffer`: records queued before new ones are dropped.
/// - `batch_size`: records delivered per batch.
/// - `flush_interval`: longest wait before a partial batch is delivered.
/// - `max_retries`: extra attempts for a failing sink before a record is
///   given up on.
/// - `log_cache_events`: deliver events carrying the cache marker.
/// - `console_level` / `file_level`: per-kind minimum levels.
/// - `format`: line format for console and file sinks.
/// - `sinks`: sink specs built by [`init_dispatcher`](crate::init::init_dispatcher).
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchConfig {
    pub channel_buffer: usize,
    pub batch_size: usize,
    pub flush_interval: Duration,
    pub max_retries: u32,
    pub log_cache_events: bool,
    pub console_level: Level,
    pub file_level: Level,
    pub format: LogFormat,
    pub sinks: Vec<String>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 1024,
            batch_size: 128,
            flush_interval: Duration::from_secs(1),
            max_retries: 3,
            log_cache_events: false,
            console_level: Level::Info,
            file_level: Level::Debug,
            format: LogFormat::Text,
            sinks: vec!["stdout".to_string()],
        }
    }
}

impl DispatchConfig {
    /// Defaults overridden by `EVENT_LOG_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(EVENT_LOG_CACHE_EVENTS_ENV) {
            config.log_cache_events = parse_flag(EVENT_LOG_CACHE_EVENTS_ENV, &raw)?;
        }
        if let Some(raw) = lookup(EVENT_LOG_CONSOLE_LEVEL_ENV) {
            config.console_level = parse_value(EVENT_LOG_CONSOLE_LEVEL_ENV, &raw)?;
        }
        if let Some(raw) = lookup(EVENT_LOG_FILE_LEVEL_ENV) {
            config.file_level = parse_value(EVENT_LOG_FILE_LEVEL_ENV, &raw)?;
        }
        if let Some(raw) = lookup(EVENT_LOG_FORMAT_ENV) {
            config.format = parse_value(EVENT_LOG_FORMAT_ENV, &raw)?;
        }
        if let Some(raw) = lookup(EVENT_LOG_BATCH_SIZE_ENV) {
            config.batch_size = parse_value(EVENT_LOG_BATCH_SIZE_ENV, &raw)?;
        }
        if let Some(raw) = lookup(EVENT_LOG_CHANNEL_BUFFER_ENV) {
            config.channel_buffer = parse_value(EVENT_LOG_CHANNEL_BUFFER_ENV, &raw)?;
        }
        if let Some(raw) = lookup(EVENT_LOG_SINKS_ENV) {
            config.sinks = raw
                .split(',')
                .map(str::trim)
                .filter(|spec| !spec.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(config)
    }

    /// Minimum level a sink of `kind` accepts.
    pub fn threshold(&self, kind: SinkKind) -> Level {
        match kind {
            SinkKind::Console => self.console_level,
            SinkKind::File => self.file_level,
            SinkKind::Structured => Level::Test,
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("unknown log format: {s}")),
        }
    }
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}
