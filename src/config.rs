//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Parsing goes through an injectable
//! lookup function so tests never touch the process environment.

use std::net::SocketAddr;
use std::time::Duration;

use reqwest::Url;

use crate::error::GatewayError;

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per log line.
    Json,
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3001`).
    pub listen_addr: SocketAddr,

    /// Base URL of the upstream platform. REST calls go to `/api/v1`
    /// below it, event subscriptions to `/ws`.
    pub upstream_endpoint: Url,

    /// Namespace addressed when a request does not name one.
    pub default_namespace: String,

    /// Per-request timeout for upstream REST calls.
    pub upstream_timeout: Duration,

    /// Channel capacity between an upstream event reader and its session.
    pub event_buffer_capacity: usize,

    /// Log line format.
    pub log_format: LogFormat,
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file,
    /// then delegates to [`GatewayConfig::from_lookup`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if a set variable cannot be
    /// parsed.
    pub fn from_env() -> Result<Self, GatewayError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Falls back to defaults for unset keys.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if `LISTEN_ADDR` is not a
    /// socket address, `FF_ENDPOINT` is not an `http`/`https` URL, or
    /// `FF_DEFAULT_NAMESPACE` is blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GatewayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_raw = lookup("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:3001".to_string());
        let listen_addr: SocketAddr = listen_raw.parse().map_err(|_| {
            GatewayError::InvalidConfig(format!("LISTEN_ADDR is not a socket address: {listen_raw}"))
        })?;

        let endpoint_raw =
            lookup("FF_ENDPOINT").unwrap_or_else(|| "http://localhost:5000".to_string());
        let upstream_endpoint = Url::parse(&endpoint_raw).map_err(|e| {
            GatewayError::InvalidConfig(format!("FF_ENDPOINT is not a URL ({e}): {endpoint_raw}"))
        })?;
        if !matches!(upstream_endpoint.scheme(), "http" | "https") {
            return Err(GatewayError::InvalidConfig(format!(
                "FF_ENDPOINT must use http or https: {endpoint_raw}"
            )));
        }

        let default_namespace =
            lookup("FF_DEFAULT_NAMESPACE").unwrap_or_else(|| "default".to_string());
        if default_namespace.trim().is_empty() {
            return Err(GatewayError::InvalidConfig(
                "FF_DEFAULT_NAMESPACE must not be empty".to_string(),
            ));
        }

        let upstream_timeout = Duration::from_secs(parse_or(&lookup, "UPSTREAM_TIMEOUT_SECS", 30));
        let event_buffer_capacity = parse_or(&lookup, "EVENT_BUFFER_CAPACITY", 256_usize).max(1);

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            listen_addr,
            upstream_endpoint,
            default_namespace,
            upstream_timeout,
            event_buffer_capacity,
            log_format,
        })
    }
}

/// Parses a looked-up value as `T`, returning `default` on missing
/// or invalid values.
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<GatewayConfig, GatewayError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let Ok(cfg) = load(&[]) else {
            panic!("defaults must parse");
        };
        assert_eq!(cfg.listen_addr.port(), 3001);
        assert_eq!(cfg.upstream_endpoint.as_str(), "http://localhost:5000/");
        assert_eq!(cfg.default_namespace, "default");
        assert_eq!(cfg.upstream_timeout, Duration::from_secs(30));
        assert_eq!(cfg.event_buffer_capacity, 256);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn overrides_are_read() {
        let Ok(cfg) = load(&[
            ("LISTEN_ADDR", "127.0.0.1:8080"),
            ("FF_ENDPOINT", "https://firefly.example.com:5443"),
            ("FF_DEFAULT_NAMESPACE", "payments"),
            ("UPSTREAM_TIMEOUT_SECS", "5"),
            ("EVENT_BUFFER_CAPACITY", "16"),
            ("LOG_FORMAT", "json"),
        ]) else {
            panic!("overrides must parse");
        };
        assert_eq!(cfg.listen_addr.port(), 8080);
        assert_eq!(cfg.upstream_endpoint.scheme(), "https");
        assert_eq!(cfg.default_namespace, "payments");
        assert_eq!(cfg.upstream_timeout, Duration::from_secs(5));
        assert_eq!(cfg.event_buffer_capacity, 16);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_listen_addr_is_rejected() {
        assert!(matches!(
            load(&[("LISTEN_ADDR", "not-an-addr")]),
            Err(GatewayError::InvalidConfig(_))
        ));
    }

    #[test]
    fn non_http_endpoint_is_rejected() {
        assert!(matches!(
            load(&[("FF_ENDPOINT", "ftp://example.com")]),
            Err(GatewayError::InvalidConfig(_))
        ));
    }

    #[test]
    fn blank_namespace_is_rejected() {
        assert!(matches!(
            load(&[("FF_DEFAULT_NAMESPACE", "  ")]),
            Err(GatewayError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_buffer_is_clamped() {
        let Ok(cfg) = load(&[("EVENT_BUFFER_CAPACITY", "0")]) else {
            panic!("must parse");
        };
        assert_eq!(cfg.event_buffer_capacity, 1);
    }
}
