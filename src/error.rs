/// Crate-wide result type.
pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // =========
    // Config / startup
    // =========
    #[error("Configuration file IO error: {0}")]
    ConfigIo(std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    ConfigToml(#[from] toml::de::Error),

    #[error("Missing configuration field: {0}")]
    MissingConfig(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // =========
    // TLS certificate (REDIS_CERT_PATH)
    // =========
    #[error("Certificate error for '{path}': {reason}")]
    Certificate { path: String, reason: String },

    // =========
    // Redis
    // =========
    /// Server unreachable, handshake/auth failure or connect timeout.
    #[error("Redis connection error: {0}")]
    Connection(String),

    /// INFO / SLOWLOG failed or timed out.
    #[error("Redis command {command} failed: {reason}")]
    Command {
        command: &'static str,
        reason: String,
    },

    // =========
    // Output
    // =========
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prometheus encoding error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("Output IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::ConfigIo(_)
            | AppError::ConfigToml(_)
            | AppError::MissingConfig(_)
            | AppError::InvalidConfig(_) => 2,
            AppError::Certificate { .. } => 3,
            AppError::Connection(_) => 4,
            AppError::Command { .. } => 5,
            AppError::Json(_)
            | AppError::Prometheus(_)
            | AppError::Io(_)
            | AppError::Internal(_) => 1,
        }
    }

    /// Exit code for a run that failed somewhere under `anyhow` context;
    /// anything that is not an `AppError` maps to 1.
    pub fn exit_code_of(err: &anyhow::Error) -> i32 {
        err.downcast_ref::<AppError>().map_or(1, AppError::exit_code)
    }

    pub(crate) fn command(command: &'static str, reason: impl std::fmt::Display) -> Self {
        AppError::Command {
            command,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_taxonomy() {
        assert_eq!(AppError::MissingConfig("redis.url").exit_code(), 2);
        assert_eq!(AppError::InvalidConfig("x".into()).exit_code(), 2);
        assert_eq!(
            AppError::Certificate {
                path: "/tmp/ca".into(),
                reason: "missing".into()
            }
            .exit_code(),
            3
        );
        assert_eq!(AppError::Connection("refused".into()).exit_code(), 4);
        assert_eq!(AppError::command("INFO", "timeout").exit_code(), 5);
        assert_eq!(AppError::Internal("boom".into()).exit_code(), 1);
    }

    #[test]
    fn exit_code_survives_anyhow_context() {
        use anyhow::Context;

        let res: AppResult<()> = Err(AppError::command("INFO", "timed out after 5s"));
        let err = res
            .context("failed to collect redis metrics")
            .unwrap_err();
        assert_eq!(AppError::exit_code_of(&err), 5);

        let res: AppResult<()> = Err(AppError::Connection("refused".into()));
        let err = res.context("failed to connect to redis").unwrap_err();
        assert_eq!(AppError::exit_code_of(&err), 4);

        assert_eq!(AppError::exit_code_of(&anyhow::anyhow!("runtime")), 1);
    }

    #[test]
    fn command_error_names_the_command() {
        let e = AppError::command("SLOWLOG", "timed out after 5s");
        assert_eq!(e.to_string(), "Redis command SLOWLOG failed: timed out after 5s");
    }
}
