use crate::collector::StatusSource;
use crate::error::{AppError, AppResult};
use crate::redis::config::RedisSettings;
use crate::redis::info::RawStatusMap;
use crate::redis::slowlog::{SlowlogEntry, parse_slowlog};
use crate::redis::tls::load_root_cert;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{RedisResult, TlsCertificates, Value};
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Thin Redis client wrapper:
/// - owns one multiplexed connection for the lifetime of a run
/// - provides only the primitives the collector needs (PING, INFO, SLOWLOG GET)
/// - enforces connect / per-command timeouts at the wrapper boundary
///
/// Dropping the value closes the connection.
pub struct RedisClient {
    conn: MultiplexedConnection,
    command_timeout: Duration,
    ping_rtt: Duration,
}

impl RedisClient {
    /// Open the client (with the CA certificate, if configured), connect and PING.
    pub async fn connect(settings: &RedisSettings) -> AppResult<Self> {
        let client = open_client(settings)?;
        let target = settings.redacted_url();

        tracing::debug!(url = %target, tls = settings.is_tls(), "redis connecting");

        let conn = timeout(
            settings.connect_timeout,
            client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| {
            AppError::Connection(format!(
                "connect to {target} timed out after {:?}",
                settings.connect_timeout
            ))
        })?
        .map_err(|e| AppError::Connection(format!("connect to {target}: {e}")))?;

        let mut this = Self {
            conn,
            command_timeout: settings.command_timeout,
            ping_rtt: Duration::ZERO,
        };

        // INFO would fail the same way, but PING gives a clearer error for auth problems
        this.ping_rtt = this
            .ping()
            .await
            .map_err(|e| AppError::Connection(format!("{target}: {e}")))?;

        tracing::debug!(
            url = %target,
            ping_rtt_ms = this.ping_rtt.as_secs_f64() * 1000.0,
            "redis connected"
        );

        Ok(this)
    }

    /// RTT of the PING issued while connecting.
    pub fn ping_rtt(&self) -> Duration {
        self.ping_rtt
    }

    /// Liveness check; returns the round trip time.
    pub async fn ping(&self) -> AppResult<Duration> {
        let started = Instant::now();
        let pong: String = self
            .with_timeout("PING", async {
                let mut conn = self.conn.clone();
                redis::cmd("PING").query_async(&mut conn).await
            })
            .await?;

        if pong != "PONG" {
            return Err(AppError::command("PING", format!("unexpected reply '{pong}'")));
        }
        Ok(started.elapsed())
    }

    /// `INFO` (default sections) parsed into a raw status map.
    pub async fn info(&self) -> AppResult<RawStatusMap> {
        let raw: String = self
            .with_timeout("INFO", async {
                let mut conn = self.conn.clone();
                redis::cmd("INFO").query_async(&mut conn).await
            })
            .await?;

        Ok(RawStatusMap::parse(&raw))
    }

    /// `SLOWLOG GET <max_len>`, decoded.
    pub async fn slowlog(&self, max_len: usize) -> AppResult<Vec<SlowlogEntry>> {
        let v: Value = self
            .with_timeout("SLOWLOG", async {
                let mut conn = self.conn.clone();
                redis::cmd("SLOWLOG")
                    .arg("GET")
                    .arg(max_len)
                    .query_async(&mut conn)
                    .await
            })
            .await?;

        Ok(parse_slowlog(&v))
    }

    /// Internal: execute a future with the client command timeout.
    async fn with_timeout<T>(
        &self,
        command: &'static str,
        fut: impl std::future::Future<Output = RedisResult<T>>,
    ) -> AppResult<T> {
        timeout(self.command_timeout, fut)
            .await
            .map_err(|_| {
                AppError::command(
                    command,
                    format!("timed out after {:?}", self.command_timeout),
                )
            })?
            .map_err(|e| AppError::command(command, e))
    }
}

#[async_trait]
impl StatusSource for RedisClient {
    async fn info(&self) -> AppResult<RawStatusMap> {
        RedisClient::info(self).await
    }

    async fn slowlog(&self, max_len: usize) -> AppResult<Vec<SlowlogEntry>> {
        RedisClient::slowlog(self, max_len).await
    }
}

fn open_client(settings: &RedisSettings) -> AppResult<redis::Client> {
    let invalid = |e: redis::RedisError| {
        AppError::InvalidConfig(format!(
            "invalid redis url '{}': {e}",
            settings.redacted_url()
        ))
    };

    match &settings.cert_path {
        Some(path) if settings.is_tls() => {
            let root_cert = load_root_cert(path)?;
            redis::Client::build_with_tls(
                settings.url.as_str(),
                TlsCertificates {
                    client_tls: None,
                    root_cert: Some(root_cert),
                },
            )
            .map_err(invalid)
        }
        Some(path) => {
            // still validated: a broken REDIS_CERT_PATH is fatal whatever the scheme
            load_root_cert(path)?;
            tracing::warn!(
                url = %settings.redacted_url(),
                cert_path = %path.display(),
                "certificate configured but url is not rediss://; connecting without TLS"
            );
            redis::Client::open(settings.url.as_str()).map_err(invalid)
        }
        None => redis::Client::open(settings.url.as_str()).map_err(invalid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn open_rejects_malformed_url() {
        let settings = RedisSettings::new("redis://user:pw@:notaport");
        let err = open_client(&settings).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig(_)));
        assert!(!err.to_string().contains(":pw@"));
    }

    #[test]
    fn tls_url_with_unreadable_cert_fails_before_connecting() {
        let mut settings = RedisSettings::new("rediss://cache.internal:6380/0");
        settings.cert_path = Some(PathBuf::from("/nonexistent/redis-ca.b64"));

        let err = open_client(&settings).unwrap_err();
        assert!(matches!(err, AppError::Certificate { .. }));
    }

    #[test]
    fn plain_url_with_unreadable_cert_is_certificate_error() {
        let mut settings = RedisSettings::new("redis://127.0.0.1:6379/0");
        settings.cert_path = Some(PathBuf::from("/nonexistent/redis-ca.b64"));

        let err = open_client(&settings).unwrap_err();
        assert!(matches!(err, AppError::Certificate { .. }), "{err}");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn plain_url_with_garbage_cert_is_certificate_error() {
        let path = std::env::temp_dir()
            .join(format!("redis-metrics-garbage-{}.b64", std::process::id()));
        std::fs::write(&path, "not base64 at all!").unwrap();

        let mut settings = RedisSettings::new("redis://127.0.0.1:6379/0");
        settings.cert_path = Some(path.clone());
        let res = open_client(&settings);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(res, Err(AppError::Certificate { .. })));
    }

    #[test]
    fn plain_url_with_valid_cert_opens() {
        use base64::Engine;
        use base64::engine::general_purpose::STANDARD;

        let path = std::env::temp_dir()
            .join(format!("redis-metrics-valid-{}.b64", std::process::id()));
        let pem = "-----BEGIN CERTIFICATE-----\nMIIBszCCAVmgAwIBAgIUQ==\n-----END CERTIFICATE-----\n";
        std::fs::write(&path, STANDARD.encode(pem)).unwrap();

        let mut settings = RedisSettings::new("redis://127.0.0.1:6379/0");
        settings.cert_path = Some(path.clone());
        let res = open_client(&settings);
        let _ = std::fs::remove_file(&path);

        assert!(res.is_ok());
    }

    #[tokio::test]
    async fn unreachable_server_is_connection_error() {
        // port 1 on loopback: refused immediately on any sane host
        let mut settings = RedisSettings::new("redis://127.0.0.1:1/0");
        settings.connect_timeout = Duration::from_millis(500);

        let err = RedisClient::connect(&settings).await.err().unwrap();
        assert!(matches!(err, AppError::Connection(_)), "{err}");
        assert_eq!(err.exit_code(), 4);
    }
}
