use crate::cli::{Cli, LogFormat, OutputFormat};
use crate::error::{AppError, AppResult};
use crate::redis::config::{
    DEFAULT_COMMAND_TIMEOUT_MS, DEFAULT_CONNECT_TIMEOUT_MS, RedisSettings,
};
use clap::ValueEnum;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SLOWLOG_MAX_LEN: usize = 128;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_SERVICE_NAME: &str = "redis-metrics";

/// Fully resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub redis: RedisSettings,
    pub collector: CollectorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectorConfig {
    pub slowlog_max_len: usize,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub service: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::default(),
            service: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

// --------------------------------------------------
// Optional TOML file (lowest precedence)
// --------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub redis: FileRedis,
    pub collector: FileCollector,
    pub logging: FileLogging,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileRedis {
    pub url: Option<String>,
    pub cert_path: Option<PathBuf>,
    pub connect_timeout_ms: Option<u64>,
    pub command_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileCollector {
    pub slowlog_max_len: Option<usize>,
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileLogging {
    pub level: Option<String>,
    pub format: Option<LogFormat>,
    pub service: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(AppError::ConfigIo)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> AppResult<Self> {
        Ok(toml::from_str(contents)?) // AppError::ConfigToml
    }
}

/// Resolve config from the process environment (and the `--config` file, if any).
pub fn load_app_config(cli: &Cli) -> AppResult<AppConfig> {
    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    resolve(cli, &file, |key| std::env::var(key).ok())
}

/// CLI > env > file > default. `env` is injected so resolution stays testable.
pub fn resolve<E>(cli: &Cli, file: &FileConfig, env: E) -> AppResult<AppConfig>
where
    E: Fn(&str) -> Option<String>,
{
    let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    let url = cli
        .redis_url
        .clone()
        .or_else(|| env("REDIS_URL"))
        .or_else(|| file.redis.url.clone())
        .ok_or(AppError::MissingConfig("REDIS_URL"))?;

    let cert_path = cli
        .redis_cert_path
        .clone()
        .or_else(|| env("REDIS_CERT_PATH").map(PathBuf::from))
        .or_else(|| file.redis.cert_path.clone());

    let connect_timeout_ms = pick(
        cli.connect_timeout_ms,
        parse_env(&env, "REDIS_CONNECT_TIMEOUT_MS")?,
        file.redis.connect_timeout_ms,
        DEFAULT_CONNECT_TIMEOUT_MS,
    );
    let command_timeout_ms = pick(
        cli.command_timeout_ms,
        parse_env(&env, "REDIS_COMMAND_TIMEOUT_MS")?,
        file.redis.command_timeout_ms,
        DEFAULT_COMMAND_TIMEOUT_MS,
    );
    let slowlog_max_len = pick(
        cli.slowlog_max_len,
        parse_env(&env, "REDIS_SLOWLOG_MAX_LEN")?,
        file.collector.slowlog_max_len,
        DEFAULT_SLOWLOG_MAX_LEN,
    );
    let format = pick(
        cli.format,
        enum_env(&env, "METRICS_FORMAT")?,
        file.collector.format,
        OutputFormat::default(),
    );

    let level = cli
        .log_level
        .clone()
        .or_else(|| env("LOG_LEVEL"))
        .or_else(|| file.logging.level.clone())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    let log_format = pick(
        cli.log_format,
        enum_env(&env, "LOG_FORMAT")?,
        file.logging.format,
        LogFormat::default(),
    );
    let service = env("SERVICE_NAME")
        .or_else(|| file.logging.service.clone())
        .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string());

    let cfg = AppConfig {
        redis: RedisSettings {
            url,
            cert_path,
            connect_timeout: Duration::from_millis(connect_timeout_ms),
            command_timeout: Duration::from_millis(command_timeout_ms),
        },
        collector: CollectorConfig {
            slowlog_max_len,
            format,
        },
        logging: LoggingConfig {
            level,
            format: log_format,
            service,
        },
    };

    validate_config(&cfg)?;
    Ok(cfg)
}

fn validate_config(cfg: &AppConfig) -> AppResult<()> {
    let url = cfg.redis.url.trim();
    if url.is_empty() {
        return Err(AppError::MissingConfig("REDIS_URL"));
    }

    const SCHEMES: [&str; 4] = ["redis://", "rediss://", "redis+unix://", "unix://"];
    if !SCHEMES.iter().any(|s| url.starts_with(s)) {
        return Err(AppError::InvalidConfig(format!(
            "redis url '{}' must start with one of {}",
            cfg.redis.redacted_url(),
            SCHEMES.join(", ")
        )));
    }

    for (name, value) in [
        ("connect_timeout_ms", cfg.redis.connect_timeout),
        ("command_timeout_ms", cfg.redis.command_timeout),
    ] {
        if value.is_zero() {
            return Err(AppError::InvalidConfig(format!("{name} must be > 0")));
        }
    }

    Ok(())
}

fn pick<T>(cli: Option<T>, env: Option<T>, file: Option<T>, default: T) -> T {
    cli.or(env).or(file).unwrap_or(default)
}

fn parse_env<E, T>(env: &E, key: &str) -> AppResult<Option<T>>
where
    E: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                AppError::InvalidConfig(format!("{key}='{raw}' is not valid: {e}"))
            })
        })
        .transpose()
}

fn enum_env<E, T>(env: &E, key: &str) -> AppResult<Option<T>>
where
    E: Fn(&str) -> Option<String>,
    T: ValueEnum,
{
    env(key)
        .map(|raw| {
            T::from_str(raw.trim(), true)
                .map_err(|e| AppError::InvalidConfig(format!("{key}='{raw}': {e}")))
        })
        .transpose()
}
