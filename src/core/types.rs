use crate::core::errors::{BtcMarketsError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cursor paging shared by the list endpoints.
///
/// `before` and `after` are record ids; at most one may be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub before: Option<u64>,
    pub after: Option<u64>,
    pub limit: Option<u32>,
}

impl Pagination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before(mut self, id: u64) -> Self {
        self.before = Some(id);
        self
    }

    pub fn after(mut self, id: u64) -> Self {
        self.after = Some(id);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.before.is_some() && self.after.is_some() {
            return Err(BtcMarketsError::InvalidParameters(
                "before and after cannot both be set".to_string(),
            ));
        }
        if self.limit == Some(0) {
            return Err(BtcMarketsError::InvalidParameters(
                "limit must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Query parameters for the set fields, after validating them.
    pub fn to_query(&self) -> Result<Vec<(&'static str, String)>> {
        self.validate()?;
        let mut params = Vec::with_capacity(2);
        if let Some(before) = self.before {
            params.push(("before", before.to_string()));
        }
        if let Some(after) = self.after {
            params.push(("after", after.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        Ok(params)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerTime {
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Market data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub market_id: String,        // e.g., BTC-AUD
    pub base_asset_name: String,  // BTC
    pub quote_asset_name: String, // AUD
    #[serde(with = "rust_decimal::serde::str")]
    pub min_order_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub max_order_amount: Decimal,
    pub amount_decimals: String, // Allowed decimal places for amounts
    pub price_decimals: String,  // Allowed decimal places for prices
    #[serde(default)]
    pub status: Option<String>, // Online, Post Only, Limit Only, Offline
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    pub market_id: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub best_bid: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub best_ask: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub last_price: Decimal,
    #[serde(rename = "volume24h", with = "rust_decimal::serde::str")]
    pub volume_24h: Decimal,
    #[serde(rename = "volumeQte24h", default, with = "rust_decimal::serde::str_option")]
    pub volume_quote_24h: Option<Decimal>,
    #[serde(rename = "price24h", with = "rust_decimal::serde::str")]
    pub price_24h: Decimal,
    #[serde(rename = "pricePct24h", default, with = "rust_decimal::serde::str_option")]
    pub price_pct_24h: Option<Decimal>,
    #[serde(rename = "low24h", with = "rust_decimal::serde::str")]
    pub low_24h: Decimal,
    #[serde(rename = "high24h", with = "rust_decimal::serde::str")]
    pub high_24h: Decimal,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub side: OrderSide, // Taker side
}

/// Levels are `[price, amount]`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderBook {
    pub market_id: String,
    pub snapshot_id: u64,
    pub asks: Vec<(Decimal, Decimal)>,
    pub bids: Vec<(Decimal, Decimal)>,
}

/// Order book depth accepted by the order book endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBookLevel {
    /// Top 50 aggregated levels
    Top,
    /// Full aggregated book
    Full,
}

impl OrderBookLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "1",
            Self::Full => "2",
        }
    }
}

impl TryFrom<u8> for OrderBookLevel {
    type Error = BtcMarketsError;

    fn try_from(level: u8) -> Result<Self> {
        match level {
            1 => Ok(Self::Top),
            2 => Ok(Self::Full),
            other => Err(BtcMarketsError::InvalidParameters(format!(
                "order book level must be 1 or 2, got {}",
                other
            ))),
        }
    }
}

/// Candle bucket width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeWindow {
    OneMinute,
    OneHour,
    OneDay,
}

impl TimeWindow {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::OneHour => "1h",
            Self::OneDay => "1d",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = BtcMarketsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "1m" => Ok(Self::OneMinute),
            "1h" => Ok(Self::OneHour),
            "1d" => Ok(Self::OneDay),
            other => Err(BtcMarketsError::InvalidParameters(format!(
                "time window must be 1m, 1h or 1d, got {}",
                other
            ))),
        }
    }
}

/// Candle range: either a time span or id-style paging.
///
/// A span needs at least one bound; a missing bound leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleRange {
    Span {
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    },
    Paged(Pagination),
}

impl Default for CandleRange {
    fn default() -> Self {
        Self::Paged(Pagination::default())
    }
}

/// One OHLCV bucket. The API sends rows of six strings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(try_from = "[String; 6]")]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl TryFrom<[String; 6]> for Candle {
    type Error = String;

    fn try_from(row: [String; 6]) -> std::result::Result<Self, Self::Error> {
        let [time, open, high, low, close, volume] = row;
        let decimal = |field: &str, value: &str| {
            Decimal::from_str(value).map_err(|e| format!("candle {}: {}", field, e))
        };

        Ok(Self {
            time: DateTime::parse_from_rfc3339(&time)
                .map_err(|e| format!("candle time: {}", e))?
                .with_timezone(&Utc),
            open: decimal("open", &open)?,
            high: decimal("high", &high)?,
            low: decimal("low", &low)?,
            close: decimal("close", &close)?,
            volume: decimal("volume", &volume)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum OrderSide {
    Bid,
    Ask,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum OrderType {
    Limit,
    Market,
    #[serde(rename = "Stop Limit")]
    StopLimit,
    Stop,
    #[serde(rename = "Take Profit")]
    TakeProfit,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum TimeInForce {
    #[serde(rename = "GTC")]
    GoodTillCancelled,
    #[serde(rename = "IOC")]
    ImmediateOrCancel,
    #[serde(rename = "FOK")]
    FillOrKill,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Accepted,
    Placed,
    #[serde(rename = "Partially Matched")]
    PartiallyMatched,
    #[serde(rename = "Fully Matched")]
    FullyMatched,
    Cancelled,
    #[serde(rename = "Partially Cancelled")]
    PartiallyCancelled,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub market_id: String,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub creation_time: DateTime<Utc>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub price: Option<Decimal>, // Absent for market orders
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub open_amount: Decimal,
    pub status: OrderStatus,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub trigger_price: Option<Decimal>,
    #[serde(default)]
    pub time_in_force: Option<TimeInForce>,
    #[serde(default)]
    pub post_only: Option<bool>,
    #[serde(default)]
    pub client_order_id: Option<String>,
}

/// Order placement request
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub market_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::str_option")]
    pub price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub side: OrderSide,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::str_option")]
    pub trigger_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::str_option")]
    pub target_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_trade: Option<String>, // "P" prevents self trading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
}

impl NewOrder {
    pub fn limit(market_id: impl Into<String>, side: OrderSide, price: Decimal, amount: Decimal) -> Self {
        Self {
            price: Some(price),
            ..Self::market(market_id, side, amount)
        }
        .with_type(OrderType::Limit)
    }

    pub fn market(market_id: impl Into<String>, side: OrderSide, amount: Decimal) -> Self {
        Self {
            market_id: market_id.into(),
            price: None,
            amount,
            order_type: OrderType::Market,
            side,
            trigger_price: None,
            target_amount: None,
            time_in_force: None,
            post_only: None,
            self_trade: None,
            client_order_id: None,
        }
    }

    pub fn with_type(mut self, order_type: OrderType) -> Self {
        self.order_type = order_type;
        self
    }

    pub fn with_trigger_price(mut self, trigger_price: Decimal) -> Self {
        self.trigger_price = Some(trigger_price);
        self
    }

    pub fn with_time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = Some(time_in_force);
        self
    }

    pub fn post_only(mut self) -> Self {
        self.post_only = Some(true);
        self
    }

    pub fn with_client_order_id(mut self, client_order_id: impl Into<String>) -> Self {
        self.client_order_id = Some(client_order_id.into());
        self
    }

    /// Local checks the exchange would otherwise reject.
    pub fn validate(&self) -> Result<()> {
        if self.market_id.is_empty() {
            return Err(BtcMarketsError::InvalidParameters(
                "marketId is required".to_string(),
            ));
        }
        if self.amount <= Decimal::ZERO {
            return Err(BtcMarketsError::InvalidParameters(
                "amount must be positive".to_string(),
            ));
        }
        let needs_price = matches!(self.order_type, OrderType::Limit | OrderType::StopLimit);
        if needs_price && self.price.is_none() {
            return Err(BtcMarketsError::InvalidParameters(format!(
                "{:?} orders require a price",
                self.order_type
            )));
        }
        let needs_trigger = matches!(
            self.order_type,
            OrderType::StopLimit | OrderType::Stop | OrderType::TakeProfit
        );
        if needs_trigger && self.trigger_price.is_none() {
            return Err(BtcMarketsError::InvalidParameters(format!(
                "{:?} orders require a trigger price",
                self.order_type
            )));
        }
        Ok(())
    }
}

/// Filter for `GET /orders`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    pub market_id: Option<String>,
    pub include_closed: bool, // status=all instead of the default open orders
    pub pagination: Pagination,
}

impl OrderQuery {
    pub fn to_query(&self) -> Result<Vec<(&'static str, String)>> {
        let mut params = self.pagination.to_query()?;
        if let Some(market_id) = &self.market_id {
            params.push(("marketId", market_id.clone()));
        }
        if self.include_closed {
            params.push(("status", "all".to_string()));
        }
        Ok(params)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CancelledOrder {
    pub order_id: String,
    #[serde(default)]
    pub client_order_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Batch orders
// ---------------------------------------------------------------------------

pub const MAX_BATCH_SIZE: usize = 4;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BatchAction {
    PlaceOrder(NewOrder),
    #[serde(rename_all = "camelCase")]
    CancelOrder { order_id: String },
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    #[serde(default)]
    pub place_orders: Vec<Order>,
    #[serde(default)]
    pub cancel_orders: Vec<CancelledOrder>,
    #[serde(default)]
    pub orders: Vec<Order>, // Only set by batch lookups
    #[serde(default)]
    pub unprocessed_requests: Vec<UnprocessedRequest>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UnprocessedRequest {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub request_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Trades
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TradeFill {
    pub id: String,
    pub market_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub side: OrderSide,
    #[serde(with = "rust_decimal::serde::str")]
    pub fee: Decimal,
    pub order_id: String,
    #[serde(default)]
    pub liquidity_type: Option<String>, // Maker or Taker
    #[serde(default)]
    pub client_order_id: Option<String>,
}

/// Filter for `GET /trades`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeQuery {
    pub market_id: Option<String>,
    pub order_id: Option<String>,
    pub pagination: Pagination,
}

impl TradeQuery {
    pub fn to_query(&self) -> Result<Vec<(&'static str, String)>> {
        let mut params = self.pagination.to_query()?;
        if let Some(market_id) = &self.market_id {
            params.push(("marketId", market_id.clone()));
        }
        if let Some(order_id) = &self.order_id {
            params.push(("orderId", order_id.clone()));
        }
        Ok(params)
    }
}

// ---------------------------------------------------------------------------
// Funds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    pub asset_name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>, // Crypto withdrawals only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_transfer_id: Option<String>,
}

/// A deposit, withdrawal or generic transfer record.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: String,
    pub asset_name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub transfer_type: String, // Deposit or Withdraw
    pub creation_time: DateTime<Utc>,
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub fee: Option<Decimal>,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment_detail: Option<PaymentDetail>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetail {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub tx_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DepositAddress {
    pub address: String,
    pub asset_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalFee {
    pub asset_name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub fee: Decimal,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub asset_name: String,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub min_deposit_amount: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub max_deposit_amount: Option<Decimal>,
    #[serde(default)]
    pub deposit_decimals: Option<String>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub min_withdraw_amount: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub max_withdraw_amount: Option<Decimal>,
    #[serde(default)]
    pub withdraw_decimals: Option<String>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub withdraw_fee: Option<Decimal>,
    #[serde(default)]
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TradingFees {
    #[serde(rename = "volume30Day", with = "rust_decimal::serde::str")]
    pub volume_30_day: Decimal,
    pub fee_by_markets: Vec<MarketFee>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarketFee {
    pub market_id: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub maker_fee_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub taker_fee_rate: Decimal,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub asset_name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub available: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub locked: Decimal,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub creation_time: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
    pub asset_name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
    #[serde(rename = "type")]
    pub transaction_type: String,
    #[serde(default)]
    pub record_type: Option<String>,
    #[serde(default)]
    pub reference_id: Option<String>,
}

/// Filter for `GET /accounts/me/transactions`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionQuery {
    pub asset_name: Option<String>,
    pub pagination: Pagination,
}

impl TransactionQuery {
    pub fn to_query(&self) -> Result<Vec<(&'static str, String)>> {
        let mut params = self.pagination.to_query()?;
        if let Some(asset_name) = &self.asset_name {
            params.push(("assetName", asset_name.clone()));
        }
        Ok(params)
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    #[serde(rename = "type")]
    pub report_type: String, // e.g., TransactionReport
    pub format: String,      // json or csv
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreatedReport {
    pub report_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    #[serde(default)]
    pub content_url: Option<String>, // Set once the report is ready
    pub creation_time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub report_type: String,
    pub status: String,
    pub format: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_rejects_before_and_after() {
        let page = Pagination::new().before(10).after(5);
        assert!(matches!(
            page.validate(),
            Err(BtcMarketsError::InvalidParameters(_))
        ));
        assert!(page.to_query().is_err());
    }

    #[test]
    fn pagination_emits_only_set_fields() {
        assert!(Pagination::new().to_query().unwrap().is_empty());
        assert_eq!(
            Pagination::new().after(0).limit(20).to_query().unwrap(),
            vec![("after", "0".to_string()), ("limit", "20".to_string())]
        );
        assert!(Pagination::new().limit(0).validate().is_err());
    }

    #[test]
    fn time_window_parsing() {
        assert_eq!("1H".parse::<TimeWindow>().unwrap(), TimeWindow::OneHour);
        assert_eq!(TimeWindow::OneDay.to_string(), "1d");
        assert!("5m".parse::<TimeWindow>().is_err());
    }

    #[test]
    fn order_book_level_bounds() {
        assert_eq!(OrderBookLevel::try_from(1).unwrap(), OrderBookLevel::Top);
        assert_eq!(OrderBookLevel::try_from(2).unwrap().as_str(), "2");
        assert!(OrderBookLevel::try_from(3).is_err());
        assert!(OrderBookLevel::try_from(0).is_err());
    }

    #[test]
    fn candle_rows_decode() {
        let candles: Vec<Candle> = serde_json::from_str(
            r#"[["2019-09-02T18:00:00.000000Z","15100","15200","15100","15199","4.11970335"]]"#,
        )
        .unwrap();
        assert_eq!(candles[0].close, Decimal::new(15199, 0));
        assert_eq!(candles[0].volume, Decimal::new(411_970_335, 8));
        assert!(serde_json::from_str::<Vec<Candle>>(r#"[["bad","1","1","1","1","1"]]"#).is_err());
    }

    #[test]
    fn new_order_wire_format() {
        let order = NewOrder::limit("BTC-AUD", OrderSide::Bid, Decimal::new(1_000_000, 2), Decimal::new(1, 2))
            .post_only()
            .with_client_order_id("abc");
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "marketId": "BTC-AUD",
                "price": "10000.00",
                "amount": "0.01",
                "type": "Limit",
                "side": "Bid",
                "postOnly": true,
                "clientOrderId": "abc",
            })
        );
        order.validate().unwrap();
    }

    #[test]
    fn new_order_validation() {
        let market = NewOrder::market("BTC-AUD", OrderSide::Ask, Decimal::ONE);
        market.validate().unwrap();

        let no_price = market.clone().with_type(OrderType::Limit);
        assert!(no_price.validate().is_err());

        let stop = NewOrder::market("BTC-AUD", OrderSide::Ask, Decimal::ONE).with_type(OrderType::Stop);
        assert!(stop.validate().is_err());
        stop.with_trigger_price(Decimal::TEN).validate().unwrap();

        assert!(NewOrder::market("BTC-AUD", OrderSide::Bid, Decimal::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn batch_actions_are_externally_tagged() {
        let actions = vec![
            BatchAction::PlaceOrder(NewOrder::market("BTC-AUD", OrderSide::Bid, Decimal::ONE)),
            BatchAction::CancelOrder {
                order_id: "123".to_string(),
            },
        ];
        let json = serde_json::to_value(&actions).unwrap();
        assert_eq!(json[0]["placeOrder"]["marketId"], "BTC-AUD");
        assert_eq!(json[1], serde_json::json!({"cancelOrder": {"orderId": "123"}}));
    }

    #[test]
    fn unknown_order_status_is_tolerated() {
        let status: OrderStatus = serde_json::from_str(r#""Triggered""#).unwrap();
        assert_eq!(status, OrderStatus::Unknown);
        let status: OrderStatus = serde_json::from_str(r#""Partially Matched""#).unwrap();
        assert_eq!(status, OrderStatus::PartiallyMatched);
    }
}
