// ── Connection probes ──
//
// "Test connection" buttons as real async TCP reachability checks, each
// bounded by a timeout and a cancellation token.

use std::future::Future;
use std::time::{Duration, Instant};

use secrecy::ExposeSecret;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use crate::error::CoreError;
use crate::model::{DeviceRegistration, EmailAlertConfig};
use crate::settings::AsteriskSettings;

/// Default time allowed for a single probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// A successful probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reachable {
    pub target: String,
    pub latency: Duration,
}

/// Open (and immediately close) a TCP connection to `host:port`.
pub async fn probe_tcp(
    host: &str,
    port: u16,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Reachable, CoreError> {
    let target = format!("{host}:{port}");
    tracing::debug!(%target, ?timeout, "probing");

    let started = Instant::now();
    let connect = TcpStream::connect((host, port));
    match guarded(&target, timeout, cancel, connect).await? {
        Ok(_stream) => {
            let latency = started.elapsed();
            tracing::info!(%target, latency_ms = latency.as_millis(), "reachable");
            Ok(Reachable { target, latency })
        }
        Err(e) => Err(CoreError::ConnectionFailed {
            target,
            reason: e.to_string(),
        }),
    }
}

/// Check a router registration form, then probe its RouterOS API port.
///
/// IP address, user name and password must all be filled in before any
/// connection is attempted.
pub async fn test_device_connection(
    form: &DeviceRegistration,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Reachable, CoreError> {
    let mut missing = Vec::new();
    if form.ip.is_none() {
        missing.push("ip");
    }
    if form.username.trim().is_empty() {
        missing.push("username");
    }
    if form
        .password
        .as_ref()
        .is_none_or(|p| p.expose_secret().is_empty())
    {
        missing.push("password");
    }
    let Some(ip) = form.ip else {
        return Err(missing_fields(&missing));
    };
    if !missing.is_empty() {
        return Err(missing_fields(&missing));
    }

    probe_tcp(&ip.to_string(), form.api_port, timeout, cancel).await
}

/// Probe the configured SMTP server.
pub async fn test_smtp(
    config: &EmailAlertConfig,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Reachable, CoreError> {
    let host = config.smtp_server.trim();
    if host.is_empty() {
        return Err(CoreError::validation("smtp_server", "no SMTP server configured"));
    }
    probe_tcp(host, config.smtp_port, timeout, cancel).await
}

/// Probe the Asterisk Manager Interface port.
pub async fn test_ami(
    settings: &AsteriskSettings,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Reachable, CoreError> {
    probe_tcp(&settings.host, settings.port, timeout, cancel).await
}

// ── Internals ───────────────────────────────────────────────────────

fn missing_fields(fields: &[&str]) -> CoreError {
    CoreError::validation("connection", format!("missing {}", fields.join(", ")))
}

/// Race `fut` against the timeout and the cancellation token.
async fn guarded<F: Future>(
    target: &str,
    timeout: Duration,
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, CoreError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            tracing::debug!(%target, "probe cancelled");
            Err(CoreError::Cancelled { target: target.to_owned() })
        }
        res = tokio::time::timeout(timeout, fut) => res.map_err(|_| CoreError::Timeout {
            target: target.to_owned(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn reachable_when_listener_accepts() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let ok = probe_tcp("127.0.0.1", port, Duration::from_secs(2), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(ok.target, format!("127.0.0.1:{port}"));
    }

    #[tokio::test]
    async fn refused_connection_reports_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let err = probe_tcp("127.0.0.1", port, Duration::from_secs(2), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ConnectionFailed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_target_times_out() {
        let err = guarded(
            "blackhole:1",
            Duration::from_millis(250),
            &CancellationToken::new(),
            std::future::pending::<()>(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CoreError::Timeout { timeout_ms: 250, .. }));
    }

    #[tokio::test]
    async fn cancelled_token_wins() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = guarded(
            "blackhole:1",
            Duration::from_secs(60),
            &cancel,
            std::future::pending::<()>(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CoreError::Cancelled { .. }));
    }

    #[tokio::test]
    async fn device_test_requires_credentials() {
        let form = DeviceRegistration {
            ip: Some("127.0.0.1".parse().unwrap()),
            username: "admin".into(),
            ..DeviceRegistration::default()
        };
        let err = test_device_connection(&form, DEFAULT_PROBE_TIMEOUT, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: connection: missing password");
    }

    #[tokio::test]
    async fn device_test_probes_api_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let form = DeviceRegistration {
            ip: Some("127.0.0.1".parse().unwrap()),
            username: "admin".into(),
            password: Some(SecretString::from("pw")),
            api_port: listener.local_addr().unwrap().port(),
            ..DeviceRegistration::default()
        };
        test_device_connection(&form, DEFAULT_PROBE_TIMEOUT, &CancellationToken::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn smtp_test_needs_a_server() {
        let config = EmailAlertConfig {
            smtp_server: " ".into(),
            ..EmailAlertConfig::default()
        };
        let err = test_smtp(&config, DEFAULT_PROBE_TIMEOUT, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }
}
