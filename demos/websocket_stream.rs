use btcmarkets::{
    BtcMarketsClient, CancellationToken, Channel, ClientConfig, SubscribeMessage, WsEvent,
};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // Public channels still carry a signature, so the keys must be well-formed
    let config = ClientConfig::from_env_file("BTCMARKETS")?;
    let client = BtcMarketsClient::new(config)?;

    let message = SubscribeMessage::new(
        [Channel::Tick, Channel::Trade, Channel::OrderbookUpdate],
        ["BTC-AUD", "ETH-AUD"],
    )
    .with_channel(Channel::Heartbeat);

    let cancel = CancellationToken::new();
    let mut subscription = client.websocket().subscribe(cancel.clone(), message).await?;
    println!("Subscribed, streaming for 30 seconds (Ctrl+C to stop early)");

    let stopper = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            () = tokio::time::sleep(Duration::from_secs(30)) => {}
            _ = tokio::signal::ctrl_c() => {}
        }
        stopper.cancel();
    });

    let mut frames = 0_usize;
    while let Some(frame) = subscription.recv().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                println!("Stream failed: {}", e);
                break;
            }
        };
        frames += 1;

        match WsEvent::decode(&frame) {
            Ok(WsEvent::Tick(tick)) => println!(
                "tick   {} bid {} ask {} last {}",
                tick.market_id, tick.best_bid, tick.best_ask, tick.last_price
            ),
            Ok(WsEvent::Trade(trade)) => println!(
                "trade  {} {} @ {}",
                trade.market_id, trade.volume, trade.price
            ),
            Ok(WsEvent::OrderbookUpdate(update)) => println!(
                "book   {} snapshot {} ({} bids, {} asks)",
                update.market_id,
                update.snapshot_id,
                update.bids.len(),
                update.asks.len()
            ),
            Ok(WsEvent::Heartbeat(_)) => println!("heartbeat"),
            Ok(WsEvent::Error(error)) => println!("error  {}: {}", error.code, error.message),
            Ok(other) => println!("other  {:?}", other),
            Err(e) => println!("undecodable frame: {}", e),
        }
    }

    println!("Stream closed after {} frames", frames);
    Ok(())
}
