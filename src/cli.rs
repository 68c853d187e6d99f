use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

/// Flags override the matching environment variables, which override the
/// optional TOML file.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "redis-metrics", version, about)]
pub struct Cli {
    /// Redis connection URL (overrides REDIS_URL)
    #[arg(long)]
    pub redis_url: Option<String>,

    /// Path to a base64-encoded CA certificate (overrides REDIS_CERT_PATH)
    #[arg(long)]
    pub redis_cert_path: Option<PathBuf>,

    /// Optional TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub connect_timeout_ms: Option<u64>,

    #[arg(long)]
    pub command_timeout_ms: Option<u64>,

    /// Slow log entries to fetch after the report; 0 disables
    #[arg(long)]
    pub slowlog_max_len: Option<usize>,

    /// Report output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Log level / EnvFilter directive (overrides LOG_LEVEL)
    #[arg(long)]
    pub log_level: Option<String>,

    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Pretty,
    Prometheus,
}

#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_mirror_env_names() {
        let cli = Cli::try_parse_from([
            "redis-metrics",
            "--redis-url",
            "rediss://default:pw@cache:6380/0",
            "--redis-cert-path",
            "/etc/redis/ca.b64",
            "--format",
            "prometheus",
            "--slowlog-max-len",
            "0",
        ])
        .unwrap();

        assert_eq!(
            cli.redis_url.as_deref(),
            Some("rediss://default:pw@cache:6380/0")
        );
        assert_eq!(cli.redis_cert_path, Some(PathBuf::from("/etc/redis/ca.b64")));
        assert_eq!(cli.format, Some(OutputFormat::Prometheus));
        assert_eq!(cli.slowlog_max_len, Some(0));
        assert!(cli.log_format.is_none());
    }

    #[test]
    fn no_flags_is_valid() {
        let cli = Cli::try_parse_from(["redis-metrics"]).unwrap();
        assert!(cli.redis_url.is_none());
        assert!(cli.config.is_none());
    }
}
