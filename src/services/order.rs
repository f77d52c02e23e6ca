use crate::client::{path_segment, BtcMarketsClient};
use crate::core::errors::Result;
use crate::core::kernel::rest::NO_BODY;
use crate::core::types::{CancelledOrder, NewOrder, Order, OrderQuery};
use crate::services::market_id_params;
use reqwest::Method;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct OrderService {
    client: BtcMarketsClient,
}

impl OrderService {
    pub(crate) fn new(client: BtcMarketsClient) -> Self {
        Self { client }
    }

    /// Open orders by default; `query.include_closed` lists every status.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, query: &OrderQuery) -> Result<Vec<Order>> {
        let params = query.to_query()?;
        let request = self
            .client
            .new_request(Method::GET, "/orders", NO_BODY)?
            .with_query(&params);
        self.client.execute_authenticated(request).await
    }

    #[instrument(skip(self, order), fields(market = %order.market_id, side = ?order.side, order_type = ?order.order_type))]
    pub async fn place_order(&self, order: &NewOrder) -> Result<Order> {
        order.validate()?;
        let request = self.client.new_request(Method::POST, "/orders", Some(order))?;
        self.client.execute_authenticated(request).await
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: &str) -> Result<Order> {
        let order_id = path_segment("orderId", order_id)?;
        let request =
            self.client
                .new_request(Method::GET, &format!("/orders/{}", order_id), NO_BODY)?;
        self.client.execute_authenticated(request).await
    }

    #[instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: &str) -> Result<CancelledOrder> {
        let order_id = path_segment("orderId", order_id)?;
        let request =
            self.client
                .new_request(Method::DELETE, &format!("/orders/{}", order_id), NO_BODY)?;
        self.client.execute_authenticated(request).await
    }

    /// Cancel every open order, or only those in `market_ids` when non-empty.
    #[instrument(skip(self, market_ids), fields(markets = market_ids.len()))]
    pub async fn cancel_all_orders<S: AsRef<str>>(
        &self,
        market_ids: &[S],
    ) -> Result<Vec<CancelledOrder>> {
        let params = market_id_params(market_ids)?;
        let request = self
            .client
            .new_request(Method::DELETE, "/orders", NO_BODY)?
            .with_query(&params);
        self.client.execute_authenticated(request).await
    }
}
