use crate::core::kernel::rate_limit::{RateLimitPolicy, RateLimiter};
use base64::engine::general_purpose;
use base64::Engine;
use reqwest::Url;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_API_URL: &str = "https://api.btcmarkets.net";
pub const DEFAULT_WS_URL: &str = "wss://socket.btcmarkets.net";
pub const API_VERSION: &str = "v3";
pub const WS_VERSION: &str = "v2";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: Secret<String>,
    pub api_secret: Secret<String>,
    pub base_url: Option<String>,
    pub ws_url: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_seconds: u64,
    pub rate_limit: RateLimitPolicy,
    /// Overrides `rate_limit` with a limiter shared across clients.
    pub rate_limiter: Option<Arc<RateLimiter>>,
    pub http_client: Option<reqwest::Client>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("ws_url", &self.ws_url)
            .field("user_agent", &self.user_agent)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("rate_limit", &self.rate_limit)
            .field("shared_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

// Custom Serialize implementation - never expose secrets in serialization
impl Serialize for ClientConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ClientConfig", 6)?;
        state.serialize_field("api_key", "[REDACTED]")?;
        state.serialize_field("api_secret", "[REDACTED]")?;
        state.serialize_field("base_url", &self.base_url)?;
        state.serialize_field("ws_url", &self.ws_url)?;
        state.serialize_field("user_agent", &self.user_agent)?;
        state.serialize_field("timeout_seconds", &self.timeout_seconds)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for ClientConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ClientConfigHelper {
            api_key: String,
            api_secret: String,
            #[serde(default)]
            base_url: Option<String>,
            #[serde(default)]
            ws_url: Option<String>,
            #[serde(default)]
            user_agent: Option<String>,
            #[serde(default = "default_timeout")]
            timeout_seconds: u64,
        }

        let helper = ClientConfigHelper::deserialize(deserializer)?;
        Ok(Self {
            base_url: helper.base_url,
            ws_url: helper.ws_url,
            user_agent: helper.user_agent,
            timeout_seconds: helper.timeout_seconds,
            ..Self::new(helper.api_key, helper.api_secret)
        })
    }
}

const fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

impl ClientConfig {
    /// Create a configuration with API credentials and production endpoints
    ///
    /// # Arguments
    /// * `api_key` - Public API key issued by BTC Markets
    /// * `api_secret` - Base64-encoded private key paired with `api_key`
    #[must_use]
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            api_secret: Secret::new(api_secret.into()),
            base_url: None,
            ws_url: None,
            user_agent: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            rate_limit: RateLimitPolicy::default(),
            rate_limiter: None,
            http_client: None,
        }
    }

    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `{PREFIX}_API_KEY` (e.g., `BTCMARKETS_API_KEY`)
    /// - `{PREFIX}_API_SECRET` (e.g., `BTCMARKETS_API_SECRET`)
    /// - `{PREFIX}_BASE_URL` (optional)
    /// - `{PREFIX}_WS_URL` (optional)
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        let prefix = prefix.to_uppercase();
        let api_key_var = format!("{}_API_KEY", prefix);
        let api_secret_var = format!("{}_API_SECRET", prefix);

        let api_key = env::var(&api_key_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(api_key_var))?;
        let api_secret = env::var(&api_secret_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(api_secret_var))?;

        let mut config = Self::new(api_key, api_secret);
        config.base_url = env::var(format!("{}_BASE_URL", prefix)).ok();
        config.ws_url = env::var(format!("{}_WS_URL", prefix)).ok();
        Ok(config)
    }

    /// Create configuration from a .env file and environment variables
    ///
    /// **Security Warning**: Never commit .env files to version control!
    #[cfg(feature = "env-file")]
    pub fn from_env_file(prefix: &str) -> Result<Self, ConfigError> {
        Self::from_env_file_with_path(prefix, ".env")
    }

    /// Same as [`ClientConfig::from_env_file`] with an explicit file path.
    /// A missing file falls back to the process environment.
    #[cfg(feature = "env-file")]
    pub fn from_env_file_with_path(prefix: &str, env_file_path: &str) -> Result<Self, ConfigError> {
        match dotenv::from_path(env_file_path) {
            Ok(()) => {}
            Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "Failed to load .env file '{}': {}",
                    env_file_path, e
                )));
            }
        }

        Self::from_env(prefix)
    }

    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.api_key.expose_secret().is_empty() && !self.api_secret.expose_secret().is_empty()
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_ws_url(mut self, ws_url: impl Into<String>) -> Self {
        self.ws_url = Some(ws_url.into());
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    #[must_use]
    pub const fn with_rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.rate_limit = policy;
        self
    }

    #[must_use]
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Send requests through a caller-supplied HTTP client. `timeout_seconds`
    /// is ignored in that case.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Get API key (use carefully - exposes secret)
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Get API secret (use carefully - exposes secret)
    pub fn api_secret(&self) -> &str {
        self.api_secret.expose_secret()
    }

    /// Check credentials and endpoints before any client is built from them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key().is_empty() {
            return Err(ConfigError::MissingCredentials("api key is empty".to_string()));
        }
        if self.api_secret().is_empty() {
            return Err(ConfigError::MissingCredentials(
                "api secret is empty".to_string(),
            ));
        }
        if !self.api_key().bytes().all(|b| b.is_ascii_graphic()) {
            return Err(ConfigError::InvalidConfiguration(
                "api key must be printable ASCII".to_string(),
            ));
        }
        general_purpose::STANDARD
            .decode(self.api_secret())
            .map_err(|e| ConfigError::InvalidSecret(e.to_string()))?;

        self.rest_url()?;
        self.websocket_url()?;
        Ok(())
    }

    /// REST root with the API version appended, e.g. `https://api.btcmarkets.net/v3`.
    pub fn rest_url(&self) -> Result<Url, ConfigError> {
        versioned_url(
            self.base_url.as_deref().unwrap_or(DEFAULT_API_URL),
            API_VERSION,
        )
    }

    /// Stream endpoint with the socket version appended, e.g. `wss://socket.btcmarkets.net/v2`.
    pub fn websocket_url(&self) -> Result<Url, ConfigError> {
        versioned_url(self.ws_url.as_deref().unwrap_or(DEFAULT_WS_URL), WS_VERSION)
    }
}

fn versioned_url(root: &str, version: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(root).map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", root, e)))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(format!(
            "{}: not usable as a base URL",
            root
        )));
    }

    let path = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{}/{}", path, version));
    Ok(url)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvironmentVariable(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("API secret is not valid base64: {0}")]
    InvalidSecret(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "TXlTdXBlclNlY3JldEtleQ==";

    #[test]
    fn default_endpoints_carry_versions() {
        let config = ClientConfig::new("key", SECRET);
        assert_eq!(
            config.rest_url().unwrap().as_str(),
            "https://api.btcmarkets.net/v3"
        );
        assert_eq!(
            config.websocket_url().unwrap().as_str(),
            "wss://socket.btcmarkets.net/v2"
        );
    }

    #[test]
    fn custom_base_url_keeps_its_path() {
        let config = ClientConfig::new("key", SECRET).with_base_url("http://127.0.0.1:8080/proxy/");
        assert_eq!(
            config.rest_url().unwrap().as_str(),
            "http://127.0.0.1:8080/proxy/v3"
        );
    }

    #[test]
    fn validate_rejects_bad_credentials() {
        assert!(matches!(
            ClientConfig::new("", SECRET).validate(),
            Err(ConfigError::MissingCredentials(_))
        ));
        assert!(matches!(
            ClientConfig::new("key", "").validate(),
            Err(ConfigError::MissingCredentials(_))
        ));
        assert!(matches!(
            ClientConfig::new("key", "not base64 !!").validate(),
            Err(ConfigError::InvalidSecret(_))
        ));
        assert!(matches!(
            ClientConfig::new("key", SECRET)
                .with_base_url("not a url")
                .validate(),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(ClientConfig::new("key", SECRET).validate().is_ok());
    }

    #[test]
    fn serialization_redacts_secrets() {
        let config = ClientConfig::new("visible-key", SECRET);
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("visible-key"));
        assert!(!json.contains(SECRET));
        assert!(json.contains("[REDACTED]"));
        assert!(!format!("{:?}", config).contains("visible-key"));
    }

    #[test]
    fn deserialization_fills_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"api_key":"k","api_secret":"TXlTdXBlclNlY3JldEtleQ=="}"#)
                .unwrap();
        assert_eq!(config.api_key(), "k");
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
        assert!(config.base_url.is_none());
        assert!(config.has_credentials());
    }

    #[test]
    fn from_env_reads_prefixed_variables() {
        env::set_var("BTCM_CONFIG_TEST_API_KEY", "env-key");
        env::set_var("BTCM_CONFIG_TEST_API_SECRET", SECRET);
        env::set_var("BTCM_CONFIG_TEST_BASE_URL", "http://localhost:9000");

        let config = ClientConfig::from_env("btcm_config_test").unwrap();
        assert_eq!(config.api_key(), "env-key");
        assert_eq!(config.api_secret(), SECRET);
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:9000"));
        assert!(config.ws_url.is_none());

        assert!(matches!(
            ClientConfig::from_env("BTCM_CONFIG_TEST_MISSING"),
            Err(ConfigError::MissingEnvironmentVariable(var)) if var == "BTCM_CONFIG_TEST_MISSING_API_KEY"
        ));
    }
}
