use crate::client::{path_segment, BtcMarketsClient};
use crate::core::errors::{BtcMarketsError, Result};
use crate::core::kernel::rest::NO_BODY;
use crate::core::types::{
    Asset, DepositAddress, Pagination, Transfer, WithdrawRequest, WithdrawalFee,
};
use reqwest::Method;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::instrument;

/// Deposits, withdrawals and transfers.
#[derive(Debug, Clone)]
pub struct FundService {
    client: BtcMarketsClient,
}

impl FundService {
    pub(crate) fn new(client: BtcMarketsClient) -> Self {
        Self { client }
    }

    async fn get_signed<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let request = self
            .client
            .new_request(Method::GET, path, NO_BODY)?
            .with_query(query);
        self.client.execute_authenticated(request).await
    }

    #[instrument(skip(self, withdrawal), fields(asset = %withdrawal.asset_name))]
    pub async fn withdraw(&self, withdrawal: &WithdrawRequest) -> Result<Transfer> {
        if withdrawal.asset_name.is_empty() {
            return Err(BtcMarketsError::InvalidParameters(
                "assetName is required".to_string(),
            ));
        }
        if withdrawal.amount <= Decimal::ZERO {
            return Err(BtcMarketsError::InvalidParameters(
                "withdrawal amount must be positive".to_string(),
            ));
        }

        let request = self
            .client
            .new_request(Method::POST, "/withdrawals", Some(withdrawal))?;
        self.client.execute_authenticated(request).await
    }

    #[instrument(skip(self))]
    pub async fn list_withdrawals(&self, page: Pagination) -> Result<Vec<Transfer>> {
        self.get_signed("/withdrawals", &page.to_query()?).await
    }

    #[instrument(skip(self))]
    pub async fn get_withdrawal(&self, id: &str) -> Result<Transfer> {
        let id = path_segment("withdrawalId", id)?;
        self.get_signed(&format!("/withdrawals/{}", id), &[]).await
    }

    #[instrument(skip(self))]
    pub async fn list_deposits(&self, page: Pagination) -> Result<Vec<Transfer>> {
        self.get_signed("/deposits", &page.to_query()?).await
    }

    #[instrument(skip(self))]
    pub async fn get_deposit(&self, id: &str) -> Result<Transfer> {
        let id = path_segment("depositId", id)?;
        self.get_signed(&format!("/deposits/{}", id), &[]).await
    }

    #[instrument(skip(self))]
    pub async fn list_transfers(&self, page: Pagination) -> Result<Vec<Transfer>> {
        self.get_signed("/transfers", &page.to_query()?).await
    }

    #[instrument(skip(self))]
    pub async fn get_transfer(&self, id: &str) -> Result<Transfer> {
        let id = path_segment("transferId", id)?;
        self.get_signed(&format!("/transfers/{}", id), &[]).await
    }

    /// The asset name is sent upper-cased.
    #[instrument(skip(self))]
    pub async fn deposit_address(&self, asset_name: &str) -> Result<DepositAddress> {
        if asset_name.is_empty() {
            return Err(BtcMarketsError::InvalidParameters(
                "assetName is required".to_string(),
            ));
        }
        self.get_signed("/addresses", &[("assetName", asset_name.to_uppercase())])
            .await
    }

    #[instrument(skip(self))]
    pub async fn withdrawal_fees(&self) -> Result<Vec<WithdrawalFee>> {
        let request = self
            .client
            .new_request(Method::GET, "/withdrawal-fees", NO_BODY)?;
        self.client.execute(request).await
    }

    #[instrument(skip(self))]
    pub async fn list_assets(&self) -> Result<Vec<Asset>> {
        let request = self.client.new_request(Method::GET, "/assets", NO_BODY)?;
        self.client.execute(request).await
    }
}
