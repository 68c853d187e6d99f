use anyhow::Context;
use clap::Parser;
use redis_metrics::appconfig::{AppConfig, LoggingConfig, load_app_config};
use redis_metrics::cli::Cli;
use redis_metrics::collector;
use redis_metrics::error::AppError;
use redis_metrics::logging::init_tracing;
use redis_metrics::redis::RedisClient;
use redis_metrics::reporter::Reporter;
use std::process::ExitCode;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // rustls needs a process-wide provider for rediss://; Err means one is already set
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cfg = match load_app_config(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            let _ = init_tracing(&LoggingConfig::default());
            error!(error = %e, "invalid configuration");
            return exit_code(e.exit_code());
        }
    };

    if let Err(e) = init_tracing(&cfg.logging) {
        eprintln!("redis-metrics: {e}");
        return exit_code(e.exit_code());
    }

    let span = info_span!(
        "redis_metrics",
        run_id = %Uuid::new_v4(),
        service = %cfg.logging.service,
        pid = std::process::id(),
    );

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")
        .and_then(|rt| rt.block_on(run(cfg).instrument(span.clone())));

    let _guard = span.enter();
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let chain = format!("{e:#}");
            error!(error = %chain, "failed to run redis metrics");
            exit_code(AppError::exit_code_of(&e))
        }
    }
}

/// Connect, collect once, report. The connection is dropped on every path out.
async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    info!(
        url = %cfg.redis.redacted_url(),
        tls = cfg.redis.is_tls(),
        cert_path = ?cfg.redis.cert_path,
        format = ?cfg.collector.format,
        "collecting redis metrics"
    );

    let client = RedisClient::connect(&cfg.redis)
        .await
        .context("failed to connect to redis")?;

    let mut reporter = Reporter::stdout(cfg.collector.format);
    collector::run_once(&client, &cfg.collector, &mut reporter)
        .await
        .context("failed to collect redis metrics")?;

    Ok(())
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
