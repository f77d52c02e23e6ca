use anyhow::Context;
use btcmarkets::{BtcMarketsClient, ClientConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

const MARKET: &str = "BTC-AUD";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Credentials come from BTCMARKETS_API_KEY / BTCMARKETS_API_SECRET (or a .env file)
    let config = ClientConfig::from_env_file("BTCMARKETS")
        .context("BTCMARKETS_API_KEY and BTCMARKETS_API_SECRET must be set")?;
    let client = BtcMarketsClient::new(config)?;

    let server_time = client.server_time().await?;
    info!("Server time: {}", server_time.timestamp);

    let markets = client.market().all_markets().await?;
    info!("Found {} markets", markets.len());
    for market in markets.iter().take(5) {
        info!(
            "Market: {} ({}->{}), min order {}",
            market.market_id, market.base_asset_name, market.quote_asset_name, market.min_order_amount
        );
    }

    let ticker = client.market().ticker(MARKET).await?;
    info!(
        "{} bid {} ask {} last {}",
        ticker.market_id, ticker.best_bid, ticker.best_ask, ticker.last_price
    );

    info!("More walkthroughs: cargo run --example market_data | orders | websocket_stream");
    Ok(())
}
