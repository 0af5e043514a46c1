//! Client configuration.
//!
//! Immutable once handed to a client. Values can come from code (the
//! `with_*` setters), from any serde format, or from `TIMELINE_*`
//! environment variables layered over the defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::mapping::Coercion;

pub const DEFAULT_HOST: &str = "api.timeline.nifty.com";
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_BASE_PATH: &str = "/api/v1/";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(20);

fn default_user_agent() -> String {
    format!("TimeLine API client for Rust ver-{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Credential added to every request as `timeline_key`.
    pub timeline_key: Option<String>,
    pub request_host: String,
    pub request_port: u16,
    /// Path prefix of every endpoint. Slashes missing at either end are
    /// added when the URL is built.
    pub request_base_path: String,
    /// Zero disables the timeout.
    pub connect_timeout_ms: u64,
    /// Zero disables the timeout.
    pub read_timeout_ms: u64,
    pub user_agent: String,
    pub coercion: Coercion,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeline_key: None,
            request_host: DEFAULT_HOST.to_string(),
            request_port: DEFAULT_PORT,
            request_base_path: DEFAULT_BASE_PATH.to_string(),
            connect_timeout_ms: millis(DEFAULT_CONNECT_TIMEOUT),
            read_timeout_ms: millis(DEFAULT_READ_TIMEOUT),
            user_agent: default_user_agent(),
            coercion: Coercion::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `TIMELINE_KEY`, `TIMELINE_HOST`,
    /// `TIMELINE_PORT`, `TIMELINE_BASE_PATH`, `TIMELINE_CONNECT_TIMEOUT` and
    /// `TIMELINE_READ_TIMEOUT`. Timeouts are given in whole seconds.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(key) = lookup("TIMELINE_KEY") {
            config = config.with_timeline_key(key);
        }
        if let Some(host) = lookup("TIMELINE_HOST") {
            config = config.with_host(host);
        }
        if let Some(port) = lookup("TIMELINE_PORT") {
            config = config.with_port(parse_number("TIMELINE_PORT", &port)?);
        }
        if let Some(path) = lookup("TIMELINE_BASE_PATH") {
            config = config.with_base_path(path);
        }
        if let Some(secs) = lookup("TIMELINE_CONNECT_TIMEOUT") {
            let secs: u64 = parse_number("TIMELINE_CONNECT_TIMEOUT", &secs)?;
            config.connect_timeout_ms = secs.saturating_mul(1000);
        }
        if let Some(secs) = lookup("TIMELINE_READ_TIMEOUT") {
            let secs: u64 = parse_number("TIMELINE_READ_TIMEOUT", &secs)?;
            config.read_timeout_ms = secs.saturating_mul(1000);
        }
        Ok(config)
    }

    pub fn with_timeline_key(mut self, key: impl Into<String>) -> Self {
        self.timeline_key = Some(key.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.request_host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.request_port = port;
        self
    }

    /// Missing leading or trailing slashes are added.
    pub fn with_base_path(mut self, path: impl Into<String>) -> Self {
        self.request_base_path = normalize_base_path(path.into());
        self
    }

    /// Kept at millisecond precision; sub-millisecond parts round up.
    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout_ms = millis(connect);
        self.read_timeout_ms = millis(read);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_coercion(mut self, coercion: Coercion) -> Self {
        self.coercion = coercion;
        self
    }

    /// `http://host[:port]/base/path/`; the port is omitted when it is 80.
    pub fn base_url(&self) -> String {
        let path = normalize_base_path(self.request_base_path.clone());
        if self.request_port == DEFAULT_PORT {
            format!("http://{}{}", self.request_host, path)
        } else {
            format!("http://{}:{}{}", self.request_host, self.request_port, path)
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

fn normalize_base_path(mut path: String) -> String {
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    if !path.ends_with('/') {
        path.push('/');
    }
    path
}

fn millis(duration: Duration) -> u64 {
    let whole = duration.as_millis();
    let rounded = if duration.subsec_nanos() % 1_000_000 == 0 { whole } else { whole + 1 };
    u64::try_from(rounded).unwrap_or(u64::MAX)
}

fn parse_number<N: std::str::FromStr>(name: &str, value: &str) -> Result<N> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::Config(format!("{name} must be a number, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.timeline_key, None);
        assert_eq!(config.base_url(), "http://api.timeline.nifty.com/api/v1/");
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.read_timeout(), Duration::from_secs(20));
        assert!(config.user_agent.starts_with("TimeLine API client for Rust ver-"));
        assert_eq!(config.coercion, Coercion::Lenient);
    }

    #[test]
    fn base_url_includes_non_default_port() {
        let config = Config::new().with_host("localhost").with_port(8080).with_base_path("api/v2");
        assert_eq!(config.request_base_path, "/api/v2/");
        assert_eq!(config.base_url(), "http://localhost:8080/api/v2/");
    }

    #[test]
    fn deserializes_partial_json_over_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"timeline_key": "secret", "request_port": 3000, "coercion": "strict"}"#,
        )
        .unwrap();
        assert_eq!(config.timeline_key.as_deref(), Some("secret"));
        assert_eq!(config.request_port, 3000);
        assert_eq!(config.request_host, DEFAULT_HOST);
        assert_eq!(config.read_timeout(), DEFAULT_READ_TIMEOUT);
        assert_eq!(config.coercion, Coercion::Strict);
    }

    #[test]
    fn deserialized_base_path_gains_slashes() {
        let config: Config =
            serde_json::from_str(r#"{"request_base_path": "api/v2", "request_port": 3000}"#)
                .unwrap();
        assert_eq!(config.base_url(), "http://api.timeline.nifty.com:3000/api/v2/");

        let config: Config = serde_json::from_str(r#"{"request_base_path": ""}"#).unwrap();
        assert_eq!(config.base_url(), "http://api.timeline.nifty.com/");
    }

    #[test]
    fn sub_second_timeouts_are_kept() {
        let config = Config::new()
            .with_timeouts(Duration::from_millis(1500), Duration::from_millis(500));
        assert_eq!(config.connect_timeout(), Duration::from_millis(1500));
        assert_eq!(config.read_timeout(), Duration::from_millis(500));

        let config = Config::new().with_timeouts(Duration::from_micros(1), Duration::ZERO);
        assert_eq!(config.connect_timeout(), Duration::from_millis(1));
        assert_eq!(config.read_timeout(), Duration::ZERO);
    }

    #[test]
    fn environment_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            ("TIMELINE_KEY", "k"),
            ("TIMELINE_HOST", "example.test"),
            ("TIMELINE_PORT", "8000"),
            ("TIMELINE_READ_TIMEOUT", "5"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.timeline_key.as_deref(), Some("k"));
        assert_eq!(config.base_url(), "http://example.test:8000/api/v1/");
        assert_eq!(config.read_timeout(), Duration::from_secs(5));
        assert_eq!(config.connect_timeout(), DEFAULT_CONNECT_TIMEOUT);
    }

    #[test]
    fn bad_port_in_environment_is_rejected() {
        let err = Config::from_lookup(|name| (name == "TIMELINE_PORT").then(|| "http".to_string()))
            .unwrap_err();
        assert!(matches!(err, ApiError::Config(message) if message.contains("TIMELINE_PORT")));
    }
}
