use crate::core::errors::{BtcMarketsError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// A decoded stream frame, keyed on its `messageType`.
///
/// Frames with a type this crate does not model are kept as
/// [`WsEvent::Unknown`] rather than rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum WsEvent {
    Tick(TickEvent),
    Trade(TradeEvent),
    Orderbook(OrderbookEvent),
    OrderbookUpdate(OrderbookUpdateEvent),
    Heartbeat(HeartbeatEvent),
    Error(ErrorEvent),
    OrderChange(OrderChangeEvent),
    FundChange(FundChangeEvent),
    Unknown { message_type: String, payload: Value },
}

impl WsEvent {
    pub fn decode(frame: &[u8]) -> Result<Self> {
        let value: Value =
            serde_json::from_slice(frame).map_err(|e| BtcMarketsError::Decode(e.to_string()))?;
        let message_type = value
            .get("messageType")
            .and_then(Value::as_str)
            .ok_or_else(|| BtcMarketsError::Decode("frame has no messageType".to_string()))?
            .to_string();

        Ok(match message_type.as_str() {
            "tick" => Self::Tick(from_value(value)?),
            "trade" => Self::Trade(from_value(value)?),
            "orderbook" => Self::Orderbook(from_value(value)?),
            "orderbookUpdate" => Self::OrderbookUpdate(from_value(value)?),
            "heartbeat" => Self::Heartbeat(from_value(value)?),
            "error" => Self::Error(from_value(value)?),
            "orderChange" => Self::OrderChange(from_value(value)?),
            "fundChange" => Self::FundChange(from_value(value)?),
            _ => Self::Unknown {
                message_type,
                payload: value,
            },
        })
    }

    pub fn market_id(&self) -> Option<&str> {
        match self {
            Self::Tick(e) => Some(&e.market_id),
            Self::Trade(e) => Some(&e.market_id),
            Self::Orderbook(e) => Some(&e.market_id),
            Self::OrderbookUpdate(e) => Some(&e.market_id),
            Self::OrderChange(e) => Some(&e.market_id),
            _ => None,
        }
    }
}

fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| BtcMarketsError::Decode(e.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickEvent {
    pub market_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::str")]
    pub best_bid: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub best_ask: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub last_price: Decimal,
    #[serde(rename = "volume24h", with = "rust_decimal::serde::str")]
    pub volume_24h: Decimal,
    #[serde(rename = "price24h", default, with = "rust_decimal::serde::str_option")]
    pub price_24h: Option<Decimal>,
    #[serde(rename = "low24h", default, with = "rust_decimal::serde::str_option")]
    pub low_24h: Option<Decimal>,
    #[serde(rename = "high24h", default, with = "rust_decimal::serde::str_option")]
    pub high_24h: Option<Decimal>,
    #[serde(default)]
    pub snapshot_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeEvent {
    pub market_id: String,
    pub timestamp: DateTime<Utc>,
    pub trade_id: u64,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub volume: Decimal,
    #[serde(default)]
    pub side: Option<String>,
}

/// Snapshot levels are `[price, volume]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderbookEvent {
    pub market_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub snapshot_id: Option<u64>,
    pub bids: Vec<(Decimal, Decimal)>,
    pub asks: Vec<(Decimal, Decimal)>,
}

/// Update levels are `[price, volume, order count]`; a zero volume removes
/// the level.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderbookUpdateEvent {
    pub market_id: String,
    pub timestamp: DateTime<Utc>,
    pub snapshot_id: u64,
    #[serde(default)]
    pub snapshot: bool,
    pub bids: Vec<(Decimal, Decimal, u64)>,
    pub asks: Vec<(Decimal, Decimal, u64)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatEvent {
    #[serde(default)]
    pub channels: Vec<HeartbeatChannel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatChannel {
    pub name: String,
    #[serde(default)]
    pub market_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorEvent {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderChangeEvent {
    pub order_id: String,
    pub market_id: String,
    pub side: String,
    #[serde(rename = "type")]
    pub order_type: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub open_volume: Decimal,
    pub status: String,
    #[serde(default)]
    pub trigger_status: Option<String>,
    #[serde(default)]
    pub trades: Vec<OrderChangeTrade>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderChangeTrade {
    pub trade_id: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub volume: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub fee: Decimal,
    #[serde(default)]
    pub liquidity_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundChangeEvent {
    pub fund_transfer_id: String,
    #[serde(rename = "type")]
    pub transfer_type: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub fee: Option<Decimal>,
}
