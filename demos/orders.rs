use btcmarkets::{BtcMarketsClient, ClientConfig, NewOrder, OrderQuery, OrderSide, Pagination};
use rust_decimal::Decimal;

const MARKET: &str = "BTC-AUD";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Signed endpoints need real keys: BTCMARKETS_API_KEY / BTCMARKETS_API_SECRET
    let config = match ClientConfig::from_env_file("BTCMARKETS") {
        Ok(config) => config,
        Err(e) => {
            println!("Skipping signed calls: {}", e);
            return Ok(());
        }
    };
    let client = BtcMarketsClient::new(config)?;

    println!("=== Balances ===");
    match client.account().balances().await {
        Ok(balances) => {
            for b in balances.iter().filter(|b| !b.balance.is_zero()) {
                println!(
                    "  {} balance {} available {} locked {}",
                    b.asset_name, b.balance, b.available, b.locked
                );
            }
        }
        Err(e) => println!("Failed to fetch balances: {}", e),
    }

    println!("\n=== Trading fees ===");
    match client.account().trading_fees().await {
        Ok(fees) => {
            println!("  30 day volume {}", fees.volume_30_day);
            for fee in fees.fee_by_markets.iter().filter(|f| f.market_id == MARKET) {
                println!(
                    "  {} maker {} taker {}",
                    fee.market_id, fee.maker_fee_rate, fee.taker_fee_rate
                );
            }
        }
        Err(e) => println!("Failed to fetch trading fees: {}", e),
    }

    println!("\n=== Recent orders ===");
    let query = OrderQuery {
        market_id: Some(MARKET.to_string()),
        include_closed: true,
        pagination: Pagination::new().limit(10),
    };
    match client.orders().list_orders(&query).await {
        Ok(orders) => {
            for o in orders {
                println!(
                    "  {} {:?} {:?} {} open {} {:?}",
                    o.order_id, o.side, o.order_type, o.amount, o.open_amount, o.status
                );
            }
        }
        Err(e) => println!("Failed to list orders: {}", e),
    }

    // Placing orders moves real money; opt in explicitly
    if std::env::var("BTCMARKETS_DEMO_TRADE").as_deref() != Ok("1") {
        println!("\nSet BTCMARKETS_DEMO_TRADE=1 to place and cancel a test order");
        return Ok(());
    }

    println!("\n=== Place and cancel ===");
    // A post-only bid far below the market rests on the book without filling
    let order = NewOrder::limit(MARKET, OrderSide::Bid, Decimal::new(1000, 0), Decimal::new(1, 3))
        .post_only()
        .with_client_order_id("btcmarkets-rs-demo");
    let placed = client.orders().place_order(&order).await?;
    println!("  placed {} status {:?}", placed.order_id, placed.status);

    let fetched = client.orders().get_order(&placed.order_id).await?;
    println!("  fetched {} open {}", fetched.order_id, fetched.open_amount);

    let cancelled = client.orders().cancel_order(&placed.order_id).await?;
    println!("  cancelled {}", cancelled.order_id);

    Ok(())
}
