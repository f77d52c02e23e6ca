use thiserror::Error;

/// Every failure the client can surface.
///
/// Callers branch on the variant: `Api` carries the raw status and body of a
/// rejected call, `Cancelled` means the client's cancellation token fired while
/// waiting for a rate-limit permit, and `StreamRead` is the final item a
/// subscription delivers before its channel closes.
#[derive(Error, Debug)]
pub enum BtcMarketsError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::core::config::ConfigError),

    #[error("Malformed URL: {0}")]
    MalformedUrl(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Request cancelled while waiting for a rate limit permit")]
    Cancelled,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket connection error: {0}")]
    Connection(String),

    #[error("WebSocket read error: {0}")]
    StreamRead(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

pub type Result<T> = std::result::Result<T, BtcMarketsError>;

impl BtcMarketsError {
    /// HTTP status of a rejected call.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The exchange's error code, when a rejected call returned
    /// `{"code": "...", "message": "..."}`.
    pub fn api_error_code(&self) -> Option<String> {
        let Self::Api { body, .. } = self else {
            return None;
        };
        serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .map(|parsed| parsed.code)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[derive(serde::Deserialize)]
struct ApiErrorBody {
    code: String,
}
