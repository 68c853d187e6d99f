use crate::appconfig::LoggingConfig;
use crate::cli::LogFormat;
use crate::error::{AppError, AppResult};
use std::io;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logs go to stderr so stdout carries only
/// the metrics record.
///
/// `cfg.level` is an EnvFilter directive: `info`, `WARN`,
/// `redis_metrics=debug,redis=warn`, ...
pub fn init_tracing(cfg: &LoggingConfig) -> AppResult<()> {
    let filter = EnvFilter::try_new(&cfg.level)
        .map_err(|e| AppError::InvalidConfig(format!("log level '{}': {e}", cfg.level)))?;

    let res = match cfg.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .try_init(),
    };

    res.map_err(|e| AppError::Internal(format!("failed to set tracing subscriber: {e}")))
}
