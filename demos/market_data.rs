use btcmarkets::{BtcMarketsClient, CandleRange, ClientConfig, Pagination, TimeWindow};

const MARKET: &str = "BTC-AUD";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Market data is public, but the client still wants well-formed credentials
    let config = ClientConfig::new(
        std::env::var("BTCMARKETS_API_KEY").unwrap_or_else(|_| "public".to_string()),
        std::env::var("BTCMARKETS_API_SECRET").unwrap_or_else(|_| "cHVibGlj".to_string()),
    );
    let client = BtcMarketsClient::new(config)?;
    let market = client.market();

    println!("=== Markets ===");
    match market.all_markets().await {
        Ok(markets) => {
            println!("Fetched {} markets", markets.len());
            for m in markets.iter().take(10) {
                println!(
                    "  {} ({} -> {}) min {} max {}",
                    m.market_id, m.base_asset_name, m.quote_asset_name, m.min_order_amount, m.max_order_amount
                );
            }
        }
        Err(e) => println!("Failed to fetch markets: {}", e),
    }

    println!("\n=== Ticker {} ===", MARKET);
    match market.ticker(MARKET).await {
        Ok(ticker) => println!(
            "  bid {} ask {} last {} 24h volume {}",
            ticker.best_bid, ticker.best_ask, ticker.last_price, ticker.volume_24h
        ),
        Err(e) => println!("Failed to fetch ticker: {}", e),
    }

    println!("\n=== Recent trades ===");
    match market.trades(MARKET, Pagination::new().limit(10)).await {
        Ok(trades) => {
            for trade in trades {
                println!(
                    "  {} {:?} {} @ {} ({})",
                    trade.id, trade.side, trade.amount, trade.price, trade.timestamp
                );
            }
        }
        Err(e) => println!("Failed to fetch trades: {}", e),
    }

    println!("\n=== Order book (top) ===");
    match market.orderbook(MARKET, 1).await {
        Ok(book) => {
            println!("  snapshot {}", book.snapshot_id);
            for (price, amount) in book.asks.iter().take(5).rev() {
                println!("  ask {} x {}", price, amount);
            }
            for (price, amount) in book.bids.iter().take(5) {
                println!("  bid {} x {}", price, amount);
            }
        }
        Err(e) => println!("Failed to fetch order book: {}", e),
    }

    println!("\n=== Daily candles ===");
    let range = CandleRange::Paged(Pagination::new().limit(7));
    match market.candles(MARKET, TimeWindow::OneDay, range).await {
        Ok(candles) => {
            for c in candles {
                println!(
                    "  {} o {} h {} l {} c {} v {}",
                    c.time.date_naive(),
                    c.open,
                    c.high,
                    c.low,
                    c.close,
                    c.volume
                );
            }
        }
        Err(e) => println!("Failed to fetch candles: {}", e),
    }

    println!("\n=== Tickers for several markets ===");
    match market.tickers(&["BTC-AUD", "ETH-AUD"]).await {
        Ok(tickers) => {
            for ticker in tickers {
                println!("  {} last {}", ticker.market_id, ticker.last_price);
            }
        }
        Err(e) => println!("Failed to fetch tickers: {}", e),
    }

    Ok(())
}
