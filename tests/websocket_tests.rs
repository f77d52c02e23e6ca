mod common;

use btcmarkets::core::kernel::{HmacSigner, Signer};
use btcmarkets::{BtcMarketsError, CancellationToken, Channel, SubscribeMessage, Subscription};
use common::{client_with_ws, API_KEY, API_SECRET};
use futures_util::{SinkExt, StreamExt};
use std::future::Future;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message};

const WAIT: Duration = Duration::from_secs(5);

/// Serve exactly one connection with `handler`; returns the ws:// root URL.
async fn spawn_server<F, Fut>(handler: F) -> String
where
    F: FnOnce(TcpStream) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        handler(stream).await;
    });
    format!("ws://{}", addr)
}

async fn next(subscription: &mut Subscription) -> Option<Result<Vec<u8>, BtcMarketsError>> {
    timeout(WAIT, subscription.recv())
        .await
        .expect("subscription produced nothing in time")
}

fn tick_message() -> SubscribeMessage {
    SubscribeMessage::new([Channel::Tick], ["BTC-AUD"])
}

#[tokio::test]
async fn subscribe_frame_is_stamped_and_frames_arrive_in_order() {
    let (subscribe_tx, subscribe_rx) = oneshot::channel::<String>();
    let url = spawn_server(|stream| async move {
        let mut ws = accept_async(stream).await.unwrap();
        if let Some(Ok(Message::Text(text))) = ws.next().await {
            let _ = subscribe_tx.send(text);
        }
        for i in 0..3 {
            ws.send(Message::Text(format!("frame-{}", i))).await.unwrap();
        }
        // Keep streaming until the client goes away.
        for _ in 0..500 {
            if ws.send(Message::Text("tick".to_string())).await.is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    let client = client_with_ws(&url);
    let cancel = CancellationToken::new();
    let mut subscription = client
        .websocket()
        .subscribe(cancel.clone(), tick_message())
        .await
        .unwrap();

    for i in 0..3 {
        let frame = next(&mut subscription).await.unwrap().unwrap();
        assert_eq!(frame, format!("frame-{}", i).into_bytes());
    }

    let subscribe: serde_json::Value =
        serde_json::from_str(&timeout(WAIT, subscribe_rx).await.unwrap().unwrap()).unwrap();
    assert_eq!(subscribe["messageType"], "subscribe");
    assert_eq!(subscribe["channels"], serde_json::json!(["tick"]));
    assert_eq!(subscribe["marketIds"], serde_json::json!(["BTC-AUD"]));
    assert_eq!(subscribe["key"], API_KEY);

    let timestamp = subscribe["timestamp"].as_str().unwrap();
    let signer = HmacSigner::new(API_KEY, API_SECRET).unwrap();
    assert_eq!(
        subscribe["signature"].as_str().unwrap(),
        signer.sign_subscription(timestamp)
    );

    cancel.cancel();
    assert!(next(&mut subscription).await.is_none());
    assert!(next(&mut subscription).await.is_none());
}

#[tokio::test]
async fn caller_message_type_is_replaced_with_subscribe() {
    let (subscribe_tx, subscribe_rx) = oneshot::channel::<String>();
    let url = spawn_server(|stream| async move {
        let mut ws = accept_async(stream).await.unwrap();
        if let Some(Ok(Message::Text(text))) = ws.next().await {
            let _ = subscribe_tx.send(text);
        }
        while let Some(Ok(_)) = ws.next().await {}
    })
    .await;

    let mut message = tick_message();
    message.message_type = "addSubscription".to_string();

    let client = client_with_ws(&url);
    let subscription = client
        .websocket()
        .subscribe(CancellationToken::new(), message)
        .await
        .unwrap();

    let sent: serde_json::Value =
        serde_json::from_str(&timeout(WAIT, subscribe_rx).await.unwrap().unwrap()).unwrap();
    assert_eq!(sent["messageType"], "subscribe");
    subscription.cancel();
}

#[tokio::test]
async fn dropping_the_subscription_closes_the_socket() {
    let (closed_tx, closed_rx) = oneshot::channel::<()>();
    let url = spawn_server(|stream| async move {
        let mut ws = accept_async(stream).await.unwrap();
        let _ = ws.next().await;
        // Send nothing; wait for the client to hang up on its own.
        while let Some(Ok(message)) = ws.next().await {
            if message.is_close() {
                break;
            }
        }
        let _ = closed_tx.send(());
    })
    .await;

    let client = client_with_ws(&url);
    let subscription = client
        .websocket()
        .subscribe(CancellationToken::new(), tick_message())
        .await
        .unwrap();
    drop(subscription);

    timeout(WAIT, closed_rx)
        .await
        .expect("socket stayed open after the subscription was dropped")
        .unwrap();
}

#[tokio::test]
async fn read_error_is_delivered_once_then_channel_closes() {
    let url = spawn_server(|mut stream| async move {
        {
            let mut ws = accept_async(&mut stream).await.unwrap();
            let _ = ws.next().await;
            ws.send(Message::Text("hello".to_string())).await.unwrap();
        }
        // FIN + reserved control opcode: the client must fail the read.
        stream.write_all(&[0x8F, 0x00]).await.unwrap();
        stream.flush().await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
    })
    .await;

    let client = client_with_ws(&url);
    let mut subscription = client
        .websocket()
        .subscribe(CancellationToken::new(), tick_message())
        .await
        .unwrap();

    assert_eq!(next(&mut subscription).await.unwrap().unwrap(), b"hello");
    assert!(matches!(
        next(&mut subscription).await,
        Some(Err(BtcMarketsError::StreamRead(_)))
    ));
    assert!(next(&mut subscription).await.is_none());
}

#[tokio::test]
async fn server_close_ends_stream_without_error() {
    let url = spawn_server(|stream| async move {
        let mut ws = accept_async(stream).await.unwrap();
        let _ = ws.next().await;
        ws.send(Message::Binary(vec![1, 2, 3])).await.unwrap();
        ws.close(None).await.unwrap();
        while let Some(Ok(_)) = ws.next().await {}
    })
    .await;

    let client = client_with_ws(&url);
    let mut subscription = client
        .websocket()
        .subscribe(CancellationToken::new(), tick_message())
        .await
        .unwrap();

    assert_eq!(next(&mut subscription).await.unwrap().unwrap(), vec![1, 2, 3]);
    assert!(next(&mut subscription).await.is_none());
}

#[tokio::test]
async fn dial_failure_is_a_connection_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_with_ws(&format!("ws://{}", addr));
    let result = client
        .websocket()
        .subscribe(CancellationToken::new(), tick_message())
        .await;
    assert!(matches!(result, Err(BtcMarketsError::Connection(_))));
}
