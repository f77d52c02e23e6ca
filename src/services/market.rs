use crate::client::{path_segment, BtcMarketsClient};
use crate::core::errors::{BtcMarketsError, Result};
use crate::core::kernel::rest::NO_BODY;
use crate::core::types::{
    Candle, CandleRange, Market, OrderBook, OrderBookLevel, Pagination, Ticker, TimeWindow, Trade,
};
use crate::services::market_id_params;
use chrono::SecondsFormat;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::instrument;

/// Public market data. None of these calls are signed.
#[derive(Debug, Clone)]
pub struct MarketService {
    client: BtcMarketsClient,
}

impl MarketService {
    pub(crate) fn new(client: BtcMarketsClient) -> Self {
        Self { client }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let request = self
            .client
            .new_request(Method::GET, path, NO_BODY)?
            .with_query(query);
        self.client.execute(request).await
    }

    #[instrument(skip(self))]
    pub async fn all_markets(&self) -> Result<Vec<Market>> {
        self.get("/markets", &[]).await
    }

    #[instrument(skip(self))]
    pub async fn ticker(&self, market_id: &str) -> Result<Ticker> {
        let market_id = path_segment("marketId", market_id)?;
        self.get(&format!("/markets/{}/ticker", market_id), &[]).await
    }

    #[instrument(skip(self))]
    pub async fn trades(&self, market_id: &str, page: Pagination) -> Result<Vec<Trade>> {
        let market_id = path_segment("marketId", market_id)?;
        let query = page.to_query()?;
        self.get(&format!("/markets/{}/trades", market_id), &query)
            .await
    }

    /// Order book at `level` 1 (top 50) or 2 (full book).
    #[instrument(skip(self))]
    pub async fn orderbook(&self, market_id: &str, level: u8) -> Result<OrderBook> {
        let market_id = path_segment("marketId", market_id)?;
        let level = OrderBookLevel::try_from(level)?;
        self.get(
            &format!("/markets/{}/orderbook", market_id),
            &[("level", level.as_str().to_string())],
        )
        .await
    }

    /// Candles for `market_id`, bounded either by a time span or by paging.
    #[instrument(skip(self))]
    pub async fn candles(
        &self,
        market_id: &str,
        window: TimeWindow,
        range: CandleRange,
    ) -> Result<Vec<Candle>> {
        let market_id = path_segment("marketId", market_id)?;
        let mut query = vec![("timeWindow", window.as_str().to_string())];
        match range {
            CandleRange::Span { from, to } => {
                match (from, to) {
                    (None, None) => {
                        return Err(BtcMarketsError::InvalidParameters(
                            "candle span needs a start or an end".to_string(),
                        ));
                    }
                    (Some(from), Some(to)) if from >= to => {
                        return Err(BtcMarketsError::InvalidParameters(
                            "candle range start must be before its end".to_string(),
                        ));
                    }
                    _ => {}
                }
                if let Some(from) = from {
                    query.push(("from", from.to_rfc3339_opts(SecondsFormat::Secs, true)));
                }
                if let Some(to) = to {
                    query.push(("to", to.to_rfc3339_opts(SecondsFormat::Secs, true)));
                }
            }
            CandleRange::Paged(page) => query.extend(page.to_query()?),
        }

        self.get(&format!("/markets/{}/candles", market_id), &query)
            .await
    }

    #[instrument(skip(self, market_ids), fields(markets = market_ids.len()))]
    pub async fn tickers<S: AsRef<str>>(&self, market_ids: &[S]) -> Result<Vec<Ticker>> {
        let query = market_id_params(market_ids)?;
        self.get("/markets/tickers", &query).await
    }

    #[instrument(skip(self, market_ids), fields(markets = market_ids.len()))]
    pub async fn orderbooks<S: AsRef<str>>(
        &self,
        market_ids: &[S],
        level: u8,
    ) -> Result<Vec<OrderBook>> {
        let level = OrderBookLevel::try_from(level)?;
        let mut query = vec![("level", level.as_str().to_string())];
        query.extend(market_id_params(market_ids)?);
        self.get("/markets/orderbooks", &query).await
    }
}
