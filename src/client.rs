use crate::core::config::ClientConfig;
use crate::core::errors::{BtcMarketsError, Result};
use crate::core::kernel::rate_limit::RateLimiter;
use crate::core::kernel::rest::{ApiRequest, ReqwestRest, DEFAULT_USER_AGENT, NO_BODY};
use crate::core::kernel::signer::{HmacSigner, Signer};
use crate::core::kernel::ws::WsStreamer;
use crate::core::types::ServerTime;
use crate::services::{
    AccountService, BatchService, FundService, MarketService, OrderService, ReportService,
    TradeService, WebSocketService,
};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Entry point for the BTC Markets API.
///
/// Cheap to clone: every clone shares the same HTTP pool, rate limiter and
/// cancellation token.
#[derive(Debug, Clone)]
pub struct BtcMarketsClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    rest: ReqwestRest,
    streamer: WsStreamer,
}

impl BtcMarketsClient {
    /// Build a client from validated configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let signer: Arc<dyn Signer> =
            Arc::new(HmacSigner::new(config.api_key(), config.api_secret())?);
        let limiter = config
            .rate_limiter
            .clone()
            .unwrap_or_else(|| Arc::new(RateLimiter::new(config.rate_limit)));
        let http = match config.http_client.clone() {
            Some(client) => client,
            None => reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_seconds))
                .build()
                .map_err(|e| {
                    crate::core::config::ConfigError::InvalidConfiguration(format!(
                        "Failed to build HTTP client: {}",
                        e
                    ))
                })?,
        };

        let rest_url = config.rest_url()?;
        let ws_url = config.websocket_url()?;
        info!(rest_url = %rest_url, ws_url = %ws_url, "BTC Markets client configured");

        let rest = ReqwestRest::new(
            http,
            rest_url,
            config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT),
            Arc::clone(&signer),
            limiter,
        )?;
        let streamer = WsStreamer::new(ws_url, signer);

        Ok(Self {
            inner: Arc::new(ClientInner { rest, streamer }),
        })
    }

    /// Build a client from `BTCMARKETS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env("BTCMARKETS")?)
    }

    pub fn rest(&self) -> &ReqwestRest {
        &self.inner.rest
    }

    pub fn streamer(&self) -> &WsStreamer {
        &self.inner.streamer
    }

    pub fn base_url(&self) -> &Url {
        self.inner.rest.base_url()
    }

    pub fn ws_url(&self) -> &Url {
        self.inner.streamer.url()
    }

    /// Cancelling this token fails every pending and future rate-limit wait
    /// with [`BtcMarketsError::Cancelled`].
    pub fn cancellation_token(&self) -> &CancellationToken {
        self.inner.rest.cancellation_token()
    }

    pub fn new_request<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<ApiRequest>
    where
        B: Serialize + ?Sized,
    {
        self.inner.rest.new_request(method, path, body)
    }

    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.inner.rest.execute(request).await
    }

    pub async fn execute_authenticated<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.inner.rest.execute_authenticated(request).await
    }

    /// Exchange clock, useful for checking local clock skew before signing.
    #[instrument(skip(self))]
    pub async fn server_time(&self) -> Result<ServerTime> {
        let request = self.new_request(Method::GET, "/time", NO_BODY)?;
        self.execute(request).await
    }

    pub fn market(&self) -> MarketService {
        MarketService::new(self.clone())
    }

    pub fn orders(&self) -> OrderService {
        OrderService::new(self.clone())
    }

    pub fn batch(&self) -> BatchService {
        BatchService::new(self.clone())
    }

    pub fn trades(&self) -> TradeService {
        TradeService::new(self.clone())
    }

    pub fn funds(&self) -> FundService {
        FundService::new(self.clone())
    }

    pub fn account(&self) -> AccountService {
        AccountService::new(self.clone())
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(self.clone())
    }

    pub fn websocket(&self) -> WebSocketService {
        WebSocketService::new(self.clone())
    }
}

/// Reject ids that would change the request path.
pub(crate) fn path_segment<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() || value == "." || value == ".." || value.contains(['/', '?', '#']) {
        return Err(BtcMarketsError::InvalidParameters(format!(
            "{} must be a non-empty path segment, got {:?}",
            name, value
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_requires_valid_config() {
        assert!(matches!(
            BtcMarketsClient::new(ClientConfig::new("", "c2VjcmV0")),
            Err(BtcMarketsError::Config(_))
        ));

        let client = BtcMarketsClient::new(ClientConfig::new("key", "c2VjcmV0")).unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.btcmarkets.net/v3");
        assert_eq!(client.ws_url().as_str(), "wss://socket.btcmarkets.net/v2");
        assert!(!client.cancellation_token().is_cancelled());
    }

    #[test]
    fn clones_share_cancellation() {
        let client = BtcMarketsClient::new(ClientConfig::new("key", "c2VjcmV0")).unwrap();
        let clone = client.clone();
        client.cancellation_token().cancel();
        assert!(clone.cancellation_token().is_cancelled());
    }

    #[test]
    fn path_segments_are_checked() {
        assert_eq!(path_segment("orderId", "123").unwrap(), "123");
        assert!(path_segment("orderId", "").is_err());
        assert!(path_segment("orderId", "1/../2").is_err());
        assert!(path_segment("marketId", "BTC-AUD?x=1").is_err());
        assert!(path_segment("orderId", "..").is_err());
        assert!(path_segment("orderId", ".").is_err());
        assert_eq!(path_segment("orderId", "a..b").unwrap(), "a..b");
    }
}
