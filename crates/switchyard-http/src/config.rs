//! Runtime configuration for the HTTP gateway.
//!
//! Defaults are suitable for local development; every knob can be overridden
//! through `SWITCHYARD_*` environment variables by the process bootstrap.

use std::net::SocketAddr;
use std::time::Duration;
use switchyard_gateway::{BalancingPolicy, DEFAULT_PROBE_INTERVAL};

/// Configuration errors surfaced at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Rate limiting knobs, in requests per minute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Ceiling across all callers.
    pub global_rpm: u32,
    /// Ceiling per client identity (API key, or anonymous).
    pub per_client_rpm: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global_rpm: 1000,
            per_client_rpm: 120,
        }
    }
}

/// Full HTTP gateway configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub port: u16,
    /// How often the health monitor probes every registered service.
    pub probe_interval: Duration,
    /// Default policy handed to pools built at bootstrap.
    pub balancing_policy: BalancingPolicy,
    /// Accepted API keys; empty means anonymous access is allowed.
    pub api_keys: Vec<String>,
    pub rate_limit: RateLimitConfig,
    /// When set, failure envelopes carry internal error detail. Never enable
    /// in production.
    pub debug_errors: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 7410,
            probe_interval: DEFAULT_PROBE_INTERVAL,
            balancing_policy: BalancingPolicy::default(),
            api_keys: Vec::new(),
            rate_limit: RateLimitConfig::default(),
            debug_errors: false,
        }
    }
}

impl HttpConfig {
    /// Build a config from the environment, falling back to defaults for
    /// anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(bind) = std::env::var("SWITCHYARD_BIND") {
            config.bind_addr = bind;
        }
        if let Ok(port) = std::env::var("SWITCHYARD_PORT") {
            config.port = port
                .parse()
                .map_err(|_| ConfigError::invalid("SWITCHYARD_PORT", "expected a port number"))?;
        }
        if let Ok(secs) = std::env::var("SWITCHYARD_PROBE_INTERVAL_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                ConfigError::invalid("SWITCHYARD_PROBE_INTERVAL_SECS", "expected seconds")
            })?;
            config.probe_interval = Duration::from_secs(secs);
        }
        if let Ok(policy) = std::env::var("SWITCHYARD_BALANCING_POLICY") {
            config.balancing_policy = policy
                .parse()
                .map_err(|err| ConfigError::invalid("SWITCHYARD_BALANCING_POLICY", err))?;
        }
        if let Ok(keys) = std::env::var("SWITCHYARD_API_KEYS") {
            config.api_keys = keys
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Ok(rpm) = std::env::var("SWITCHYARD_GLOBAL_RPM") {
            config.rate_limit.global_rpm = rpm
                .parse()
                .map_err(|_| ConfigError::invalid("SWITCHYARD_GLOBAL_RPM", "expected a number"))?;
        }
        if let Ok(rpm) = std::env::var("SWITCHYARD_CLIENT_RPM") {
            config.rate_limit.per_client_rpm = rpm
                .parse()
                .map_err(|_| ConfigError::invalid("SWITCHYARD_CLIENT_RPM", "expected a number"))?;
        }
        if let Ok(debug) = std::env::var("SWITCHYARD_DEBUG_ERRORS") {
            config.debug_errors = matches!(debug.as_str(), "1" | "true" | "yes");
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot work at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::invalid("port", "must be non-zero"));
        }
        if self.rate_limit.global_rpm == 0 || self.rate_limit.per_client_rpm == 0 {
            return Err(ConfigError::invalid(
                "rate_limit",
                "limits must be non-zero",
            ));
        }
        if self.probe_interval < Duration::from_secs(1) {
            return Err(ConfigError::invalid(
                "probe_interval",
                "must be at least one second",
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.port)
            .parse()
            .map_err(|_| ConfigError::invalid("bind_addr", "not a valid socket address"))
    }
}
