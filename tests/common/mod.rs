//! Shared fixtures for the integration tests

use btcmarkets::core::kernel::{HmacSigner, Signer};
use btcmarkets::{BtcMarketsClient, ClientConfig};
use wiremock::{MockServer, Request};

pub const API_KEY: &str = "test-api-key";
/// base64("MySuperSecretKey")
pub const API_SECRET: &str = "TXlTdXBlclNlY3JldEtleQ==";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client whose REST calls go to `server`.
#[allow(dead_code)]
pub fn client_for(server: &MockServer) -> BtcMarketsClient {
    BtcMarketsClient::new(ClientConfig::new(API_KEY, API_SECRET).with_base_url(server.uri()))
        .expect("test config is valid")
}

#[allow(dead_code)]
pub fn client_with_ws(ws_url: &str) -> BtcMarketsClient {
    BtcMarketsClient::new(ClientConfig::new(API_KEY, API_SECRET).with_ws_url(ws_url))
        .expect("test config is valid")
}

#[allow(dead_code)]
pub fn ticker_json(market_id: &str) -> serde_json::Value {
    serde_json::json!({
        "marketId": market_id,
        "bestBid": "14000.12",
        "bestAsk": "14010.50",
        "lastPrice": "14005.00",
        "volume24h": "123.4567",
        "volumeQte24h": "1728394.11",
        "price24h": "210.25",
        "pricePct24h": "1.52",
        "low24h": "13700.00",
        "high24h": "14100.00",
        "timestamp": "2019-09-01T10:35:04.940000Z"
    })
}

#[allow(dead_code)]
pub fn order_json(order_id: &str) -> serde_json::Value {
    serde_json::json!({
        "orderId": order_id,
        "marketId": "BTC-AUD",
        "side": "Bid",
        "type": "Limit",
        "creationTime": "2019-08-30T11:08:21.956000Z",
        "price": "100.12",
        "amount": "1.034",
        "openAmount": "1.034",
        "status": "Accepted"
    })
}

/// Check the auth headers against what the server actually received.
#[allow(dead_code)]
pub fn assert_signed(request: &Request) {
    let header = |name: &str| {
        request
            .headers
            .get(name)
            .unwrap_or_else(|| panic!("missing header {}", name))
            .to_str()
            .unwrap()
            .to_string()
    };

    assert_eq!(header("bm-auth-apikey"), API_KEY);
    let timestamp = header("bm-auth-timestamp");
    assert!(timestamp.parse::<i64>().is_ok(), "timestamp is milliseconds");

    let signer = HmacSigner::new(API_KEY, API_SECRET).unwrap();
    let expected = signer.sign_request(
        request.method.as_str(),
        request.url.path(),
        &timestamp,
        &request.body,
    );
    assert_eq!(header("bm-auth-signature"), expected);
    assert_eq!(header("content-type"), "application/json");
    assert_eq!(header("accept-charset"), "UTF-8");
}

#[allow(dead_code)]
pub async fn received(server: &MockServer) -> Vec<Request> {
    server
        .received_requests()
        .await
        .expect("request recording is enabled")
}
