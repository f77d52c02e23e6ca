use crate::client::{path_segment, BtcMarketsClient};
use crate::core::errors::Result;
use crate::core::kernel::rest::NO_BODY;
use crate::core::types::{TradeFill, TradeQuery};
use reqwest::Method;
use tracing::instrument;

/// The account's own fills.
#[derive(Debug, Clone)]
pub struct TradeService {
    client: BtcMarketsClient,
}

impl TradeService {
    pub(crate) fn new(client: BtcMarketsClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn list_trades(&self, query: &TradeQuery) -> Result<Vec<TradeFill>> {
        let params = query.to_query()?;
        let request = self
            .client
            .new_request(Method::GET, "/trades", NO_BODY)?
            .with_query(&params);
        self.client.execute_authenticated(request).await
    }

    #[instrument(skip(self))]
    pub async fn get_trade(&self, trade_id: &str) -> Result<TradeFill> {
        let trade_id = path_segment("tradeId", trade_id)?;
        let request =
            self.client
                .new_request(Method::GET, &format!("/trades/{}", trade_id), NO_BODY)?;
        self.client.execute_authenticated(request).await
    }
}
