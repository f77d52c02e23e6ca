pub mod client;
pub mod core;
pub mod services;

pub use crate::client::BtcMarketsClient;
pub use crate::core::{
    config::{ClientConfig, ConfigError},
    errors::{BtcMarketsError, Result},
    kernel::{Channel, RateLimitPolicy, RateLimiter, SubscribeMessage, Subscription, WsEvent},
    types::*,
};
pub use tokio_util::sync::CancellationToken;
