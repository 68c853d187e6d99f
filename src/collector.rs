// src/collector.rs

use crate::appconfig::CollectorConfig;
use crate::error::AppResult;
use crate::redis::info::RawStatusMap;
use crate::redis::slowlog::SlowlogEntry;
use crate::report::{MetricsReport, extract};
use crate::reporter::Reporter;
use async_trait::async_trait;
use std::io::Write;

/// What the collector needs from a server.
/// `RedisClient` implements this; tests use in-memory fakes.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// One `INFO` round trip.
    async fn info(&self) -> AppResult<RawStatusMap>;

    /// Up to `max_len` most recent slow log entries.
    async fn slowlog(&self, max_len: usize) -> AppResult<Vec<SlowlogEntry>>;
}

/// INFO once, then extract. No retry: a failed run is retried by the scheduler.
pub async fn collect<S: StatusSource + ?Sized>(source: &S) -> AppResult<MetricsReport> {
    let info = source.info().await?;
    tracing::debug!(fields = info.len(), "redis INFO received");
    Ok(extract(&info))
}

/// Fetch and log the slow log. Failures are logged, never returned: by the
/// time this runs the metrics record has already been written.
///
/// Returns the number of entries logged.
pub async fn log_slowlog<S: StatusSource + ?Sized>(source: &S, max_len: usize) -> usize {
    match source.slowlog(max_len).await {
        Ok(entries) if entries.is_empty() => 0,
        Ok(entries) => {
            let logs = serde_json::to_string(&entries).unwrap_or_default();
            tracing::warn!(count = entries.len(), logs = %logs, "redis slow log");
            entries.len()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to retrieve redis slow log");
            0
        }
    }
}

/// One full run against an already-connected source.
pub async fn run_once<S, W>(
    source: &S,
    cfg: &CollectorConfig,
    reporter: &mut Reporter<W>,
) -> AppResult<MetricsReport>
where
    S: StatusSource + ?Sized,
    W: Write,
{
    let report = collect(source).await?;
    reporter.emit(&report)?;

    if cfg.slowlog_max_len > 0 {
        log_slowlog(source, cfg.slowlog_max_len).await;
    }

    Ok(report)
}
