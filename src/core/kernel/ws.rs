use crate::core::errors::{BtcMarketsError, Result};
use crate::core::kernel::signer::{timestamp_millis, Signer};
use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Frames are handed over one at a time; a slow consumer holds the reader back.
const FRAME_BUFFER: usize = 1;

const SUBSCRIBE_MESSAGE_TYPE: &str = "subscribe";

/// One item from a subscription: a raw frame payload, or the read error that
/// ended the stream.
pub type Frame = Result<Vec<u8>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Channel {
    Tick,
    Trade,
    Orderbook,
    OrderbookUpdate,
    OrderChange,
    FundChange,
    Heartbeat,
}

impl Channel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tick => "tick",
            Self::Trade => "trade",
            Self::Orderbook => "orderbook",
            Self::OrderbookUpdate => "orderbookUpdate",
            Self::OrderChange => "orderChange",
            Self::FundChange => "fundChange",
            Self::Heartbeat => "heartbeat",
        }
    }

    /// Channels that only deliver data on an authenticated subscription.
    pub const fn is_private(self) -> bool {
        matches!(self, Self::OrderChange | Self::FundChange)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The frame sent right after the socket opens.
///
/// `key`, `timestamp` and `signature` are filled in by the streamer; values
/// set by the caller are overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeMessage {
    pub message_type: String,
    pub channels: Vec<Channel>,
    pub market_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl SubscribeMessage {
    pub fn new<I, S>(channels: impl IntoIterator<Item = Channel>, market_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            message_type: SUBSCRIBE_MESSAGE_TYPE.to_string(),
            channels: channels.into_iter().collect(),
            market_ids: market_ids.into_iter().map(Into::into).collect(),
            key: None,
            timestamp: None,
            signature: None,
        }
    }

    /// Add channels the server should also push, such as `heartbeat`.
    pub fn with_channel(mut self, channel: Channel) -> Self {
        if !self.channels.contains(&channel) {
            self.channels.push(channel);
        }
        self
    }
}

/// Receiving half of a live subscription.
///
/// Once the cancellation token fires, `recv` yields `None` even if a frame
/// was already buffered.
#[derive(Debug)]
pub struct Subscription {
    frames: mpsc::Receiver<Frame>,
    cancel: CancellationToken,
}

impl Subscription {
    /// Next frame, or `None` once the stream has ended or been cancelled.
    pub async fn recv(&mut self) -> Option<Frame> {
        if self.cancel.is_cancelled() {
            self.frames.close();
            return None;
        }

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                self.frames.close();
                None
            }
            frame = self.frames.recv() => frame,
        }
    }

    /// Stop the stream. The reader task closes the socket.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Opens stream subscriptions against the socket endpoint.
pub struct WsStreamer {
    url: Url,
    signer: Arc<dyn Signer>,
}

impl fmt::Debug for WsStreamer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WsStreamer")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

impl WsStreamer {
    pub fn new(url: Url, signer: Arc<dyn Signer>) -> Self {
        Self { url, signer }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fill in the message type, key, timestamp and signature of `message`.
    pub fn stamp(&self, message: &mut SubscribeMessage, timestamp: &str) {
        message.message_type = SUBSCRIBE_MESSAGE_TYPE.to_string();
        message.key = Some(self.signer.api_key().to_string());
        message.signature = Some(self.signer.sign_subscription(timestamp));
        message.timestamp = Some(timestamp.to_string());
    }

    /// Dial, send the signed subscribe frame and start forwarding frames.
    ///
    /// Dial and send failures are returned here and no subscription exists.
    /// Afterwards every text or binary frame is forwarded in arrival order.
    /// A read error is delivered as one final `Err` item, after which the
    /// channel closes; a server close or end of stream just closes it.
    #[instrument(skip(self, cancel, message), fields(url = %self.url, channels = message.channels.len()))]
    pub async fn subscribe(
        &self,
        cancel: CancellationToken,
        mut message: SubscribeMessage,
    ) -> Result<Subscription> {
        let (mut socket, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| BtcMarketsError::Connection(format!("dial {}: {}", self.url, e)))?;
        debug!("WebSocket connected");

        self.stamp(&mut message, &timestamp_millis());
        let payload = serde_json::to_string(&message)
            .map_err(|e| BtcMarketsError::Serialization(e.to_string()))?;

        if let Err(e) = socket.send(Message::Text(payload)).await {
            if let Err(close_err) = socket.close(None).await {
                debug!("Close after failed subscribe: {}", close_err);
            }
            return Err(BtcMarketsError::Connection(format!(
                "send subscribe frame: {}",
                e
            )));
        }

        let (tx, rx) = mpsc::channel(FRAME_BUFFER);
        tokio::spawn(forward_frames(socket, tx, cancel.clone()));

        Ok(Subscription { frames: rx, cancel })
    }
}

async fn forward_frames(mut socket: Socket, tx: mpsc::Sender<Frame>, cancel: CancellationToken) {
    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("Subscription cancelled");
                break;
            }
            () = tx.closed() => {
                debug!("Subscription dropped");
                break;
            }
            next = socket.next() => next,
        };

        let payload = match next {
            Some(Ok(Message::Text(text))) => text.into_bytes(),
            Some(Ok(Message::Binary(data))) => data,
            Some(Ok(Message::Close(frame))) => {
                debug!(?frame, "Server closed the stream");
                break;
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                warn!("WebSocket read failed: {}", e);
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {}
                    _ = tx.send(Err(BtcMarketsError::StreamRead(e.to_string()))) => {}
                }
                break;
            }
            None => {
                debug!("Stream ended");
                break;
            }
        };

        let delivered = tokio::select! {
            biased;
            () = cancel.cancelled() => false,
            sent = tx.send(Ok(payload)) => sent.is_ok(),
        };
        if !delivered {
            break;
        }
    }

    if let Err(e) = socket.close(None).await {
        debug!("Close after stream end: {}", e);
    }
}
