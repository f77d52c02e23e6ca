//! Endpoint services. Each one is a stateless view over a cloned
//! [`BtcMarketsClient`](crate::BtcMarketsClient); all transport concerns stay
//! in the kernel.

pub mod account;
pub mod batch;
pub mod fund;
pub mod market;
pub mod order;
pub mod report;
pub mod trade;
pub mod websocket;

pub use account::AccountService;
pub use batch::BatchService;
pub use fund::FundService;
pub use market::MarketService;
pub use order::OrderService;
pub use report::ReportService;
pub use trade::TradeService;
pub use websocket::WebSocketService;

/// Repeated `marketId` parameters for the multi-market endpoints.
pub(crate) fn market_id_params<S: AsRef<str>>(
    market_ids: &[S],
) -> crate::Result<Vec<(&'static str, String)>> {
    market_ids
        .iter()
        .map(|id| {
            let id = id.as_ref();
            if id.is_empty() {
                Err(crate::BtcMarketsError::InvalidParameters(
                    "marketId cannot be empty".to_string(),
                ))
            } else {
                Ok(("marketId", id.to_string()))
            }
        })
        .collect()
}
