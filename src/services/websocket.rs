use crate::client::BtcMarketsClient;
use crate::core::errors::Result;
use crate::core::kernel::ws::{SubscribeMessage, Subscription};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct WebSocketService {
    client: BtcMarketsClient,
}

impl WebSocketService {
    pub(crate) fn new(client: BtcMarketsClient) -> Self {
        Self { client }
    }

    /// Open a signed subscription. Each call owns its own socket; `cancel`
    /// ends only this stream.
    pub async fn subscribe(
        &self,
        cancel: CancellationToken,
        message: SubscribeMessage,
    ) -> Result<Subscription> {
        self.client.streamer().subscribe(cancel, message).await
    }
}
