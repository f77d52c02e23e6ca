/// Transport kernel for the BTC Markets client
///
/// Everything that touches the wire lives here; the services in
/// [`crate::services`] only describe endpoints.
///
/// ## Transport
/// - `ReqwestRest`: builds, signs, throttles and sends REST calls
/// - `WsStreamer`: opens signed stream subscriptions
///
/// ## Authentication
/// - `Signer`: pluggable request signing
/// - `HmacSigner`: HMAC-SHA512 over the canonical request string
///
/// ## Throughput
/// - `RateLimiter`: client-wide token bucket with cancellable waits
///
/// ## Message Handling
/// - `WsEvent`: typed view over raw stream frames
///
/// # Example
/// ```rust,no_run
/// use btcmarkets::core::kernel::*;
/// use reqwest::{Client, Method, Url};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let signer = Arc::new(HmacSigner::new("api_key", "c2VjcmV0")?);
/// let rest = ReqwestRest::new(
///     Client::new(),
///     Url::parse("https://api.btcmarkets.net/v3")?,
///     DEFAULT_USER_AGENT,
///     signer,
///     Arc::new(RateLimiter::default()),
/// )?;
///
/// let request = rest.new_request(Method::GET, "/accounts/me/balances", NO_BODY)?;
/// let balances: serde_json::Value = rest.execute_authenticated(request).await?;
/// # Ok(())
/// # }
/// ```
pub mod codec;
pub mod rate_limit;
pub mod rest;
pub mod signer;
pub mod ws;

// Re-export key types for convenience
pub use codec::WsEvent;
pub use rate_limit::{RateLimitPolicy, RateLimiter};
pub use rest::{join_url, ApiRequest, ReqwestRest, DEFAULT_USER_AGENT, NO_BODY};
pub use signer::{HmacSigner, Signer};
pub use ws::{Channel, Frame, SubscribeMessage, Subscription, WsStreamer};
