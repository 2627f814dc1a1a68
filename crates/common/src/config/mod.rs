//! Client configuration types.
//!
//! Everything here is read once at construction — there is no hot reload.
//! `wren-infra` provides the loader that fills these structs from
//! environment variables or a config file; library users can equally build
//! them in code.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ClientError;

/// Complete configuration for a Wren client instance.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
}

impl ClientConfig {
    /// Validate invariants the rest of the stack assumes.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.credentials.consumer_key.is_empty() {
            return Err(ClientError::Config("consumer_key must not be empty".into()));
        }
        if self.credentials.access_token.is_some() != self.credentials.access_token_secret.is_some()
        {
            return Err(ClientError::Config(
                "access_token and access_token_secret must be set together".into(),
            ));
        }
        self.retry.validate()?;
        self.dispatcher.validate()
    }
}

/// Consumer and (optionally) pre-obtained access-token credentials.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CredentialsConfig {
    pub consumer_key: String,
    pub consumer_secret: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub access_token_secret: Option<String>,
}

/// Service endpoints. Defaults point at the production API; tests and
/// staging override them wholesale.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub rest_base_url: String,
    pub request_token_url: String,
    pub authorize_url: String,
    pub authenticate_url: String,
    pub access_token_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            rest_base_url: "https://api.wren.social/1.1".into(),
            request_token_url: "https://api.wren.social/oauth/request_token".into(),
            authorize_url: "https://api.wren.social/oauth/authorize".into(),
            authenticate_url: "https://api.wren.social/oauth/authenticate".into(),
            access_token_url: "https://api.wren.social/oauth/access_token".into(),
        }
    }
}

/// Low-level transport settings consumed by the HTTP engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Connect timeout in seconds; 0 disables the limit.
    pub connect_timeout_secs: u64,
    /// Read timeout in seconds; 0 disables the limit.
    pub read_timeout_secs: u64,
    pub user_agent: String,
    pub proxy: Option<ProxyConfig>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 20,
            read_timeout_secs: 120,
            user_agent: concat!("wren-client/", env!("CARGO_PKG_VERSION")).into(),
            proxy: None,
        }
    }
}

/// Outbound HTTP proxy, with optional basic-auth credentials.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Retry policy applied by the resilient transport.
///
/// `max_attempts` counts the initial try, so `1` means no retries — the
/// production default, matching the upstream service client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    /// Fixed sleep between attempts.
    #[serde(rename = "interval_secs", with = "duration_secs")]
    pub interval: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 1, interval: Duration::from_secs(5) }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self { max_attempts, interval }
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.max_attempts == 0 {
            return Err(ClientError::Config("retry.max_attempts must be at least 1".into()));
        }
        Ok(())
    }
}

/// Worker pool sizing for the async dispatcher.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    pub pool_size: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self { pool_size: 1 }
    }
}

impl DispatcherConfig {
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.pool_size == 0 {
            return Err(ClientError::Config("dispatcher.pool_size must be at least 1".into()));
        }
        Ok(())
    }
}

/// Serde helper mapping whole seconds to [`Duration`].
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration defaults and validation.

    use super::*;

    fn minimal() -> ClientConfig {
        ClientConfig {
            credentials: CredentialsConfig {
                consumer_key: "ck".into(),
                consumer_secret: "cs".into(),
                access_token: None,
                access_token_secret: None,
            },
            endpoints: EndpointConfig::default(),
            http: HttpConfig::default(),
            retry: RetryConfig::default(),
            dispatcher: DispatcherConfig::default(),
        }
    }

    #[test]
    fn test_defaults() {
        let retry = RetryConfig::default();
        assert_eq!(retry.max_attempts, 1);
        assert_eq!(retry.interval, Duration::from_secs(5));

        let http = HttpConfig::default();
        assert_eq!(http.connect_timeout_secs, 20);
        assert_eq!(http.read_timeout_secs, 120);
        assert!(http.user_agent.starts_with("wren-client/"));

        assert_eq!(DispatcherConfig::default().pool_size, 1);
    }

    #[test]
    fn test_validate_accepts_minimal_config() {
        assert!(minimal().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_consumer_key() {
        let mut config = minimal();
        config.credentials.consumer_key.clear();
        assert!(matches!(config.validate(), Err(ClientError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_half_configured_token() {
        let mut config = minimal();
        config.credentials.access_token = Some("token".into());
        assert!(matches!(config.validate(), Err(ClientError::Config(_))));

        config.credentials.access_token_secret = Some("secret".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_attempts_and_workers() {
        let mut config = minimal();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = minimal();
        config.dispatcher.pool_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_from_toml_fragment() {
        let parsed: ClientConfig = toml::from_str(
            r#"
            [credentials]
            consumer_key = "ck"
            consumer_secret = "cs"

            [retry]
            max_attempts = 4
            interval_secs = 2

            [dispatcher]
            pool_size = 3
            "#,
        )
        .unwrap();
        assert_eq!(parsed.retry.max_attempts, 4);
        assert_eq!(parsed.retry.interval, Duration::from_secs(2));
        assert_eq!(parsed.dispatcher.pool_size, 3);
        assert_eq!(parsed.endpoints, EndpointConfig::default());
    }

    #[test]
    fn test_deserialize_from_json() {
        let parsed: ClientConfig = serde_json::from_str(
            r#"{"credentials": {"consumer_key": "ck", "consumer_secret": "cs"}}"#,
        )
        .unwrap();
        assert_eq!(parsed.retry, RetryConfig::default());
        assert!(parsed.credentials.access_token.is_none());
    }
}
