use crate::client::BtcMarketsClient;
use crate::core::errors::Result;
use crate::core::kernel::rest::NO_BODY;
use crate::core::types::{Balance, TradingFees, Transaction, TransactionQuery};
use reqwest::Method;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct AccountService {
    client: BtcMarketsClient,
}

impl AccountService {
    pub(crate) fn new(client: BtcMarketsClient) -> Self {
        Self { client }
    }

    /// 30 day volume and the maker/taker rates it earns per market.
    #[instrument(skip(self))]
    pub async fn trading_fees(&self) -> Result<TradingFees> {
        let request =
            self.client
                .new_request(Method::GET, "/accounts/me/trading-fees", NO_BODY)?;
        self.client.execute_authenticated(request).await
    }

    #[instrument(skip(self))]
    pub async fn balances(&self) -> Result<Vec<Balance>> {
        let request = self
            .client
            .new_request(Method::GET, "/accounts/me/balances", NO_BODY)?;
        self.client.execute_authenticated(request).await
    }

    #[instrument(skip(self))]
    pub async fn transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        let params = query.to_query()?;
        let request = self
            .client
            .new_request(Method::GET, "/accounts/me/transactions", NO_BODY)?
            .with_query(&params);
        self.client.execute_authenticated(request).await
    }
}
