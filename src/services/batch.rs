use crate::client::{path_segment, BtcMarketsClient};
use crate::core::errors::{BtcMarketsError, Result};
use crate::core::kernel::rest::NO_BODY;
use crate::core::types::{BatchAction, BatchResponse, MAX_BATCH_SIZE};
use reqwest::Method;
use tracing::instrument;

/// Place and cancel several orders in one signed call.
#[derive(Debug, Clone)]
pub struct BatchService {
    client: BtcMarketsClient,
}

impl BatchService {
    pub(crate) fn new(client: BtcMarketsClient) -> Self {
        Self { client }
    }

    /// Submit up to four place/cancel actions. Actions the exchange could not
    /// process come back in `unprocessed_requests`, not as an error.
    #[instrument(skip(self, actions), fields(actions = actions.len()))]
    pub async fn submit(&self, actions: &[BatchAction]) -> Result<BatchResponse> {
        if actions.is_empty() || actions.len() > MAX_BATCH_SIZE {
            return Err(BtcMarketsError::InvalidParameters(format!(
                "a batch holds between 1 and {} actions, got {}",
                MAX_BATCH_SIZE,
                actions.len()
            )));
        }
        for action in actions {
            if let BatchAction::PlaceOrder(order) = action {
                order.validate()?;
            }
        }

        let request = self
            .client
            .new_request(Method::POST, "/batchorders", Some(actions))?;
        self.client.execute_authenticated(request).await
    }

    #[instrument(skip(self, order_ids), fields(orders = order_ids.len()))]
    pub async fn get_batch<S: AsRef<str>>(&self, order_ids: &[S]) -> Result<BatchResponse> {
        let path = batch_path(order_ids)?;
        let request = self.client.new_request(Method::GET, &path, NO_BODY)?;
        self.client.execute_authenticated(request).await
    }

    #[instrument(skip(self, order_ids), fields(orders = order_ids.len()))]
    pub async fn cancel_batch<S: AsRef<str>>(&self, order_ids: &[S]) -> Result<BatchResponse> {
        let path = batch_path(order_ids)?;
        let request = self.client.new_request(Method::DELETE, &path, NO_BODY)?;
        self.client.execute_authenticated(request).await
    }
}

fn batch_path<S: AsRef<str>>(order_ids: &[S]) -> Result<String> {
    if order_ids.is_empty() {
        return Err(BtcMarketsError::InvalidParameters(
            "at least one order id is required".to_string(),
        ));
    }
    let ids = order_ids
        .iter()
        .map(|id| path_segment("orderId", id.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    Ok(format!("/batchorders/{}", ids.join(",")))
}
