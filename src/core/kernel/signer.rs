use crate::core::config::ConfigError;
use base64::engine::general_purpose;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::fmt;
use zeroize::Zeroizing;

type HmacSha512 = Hmac<Sha512>;

/// Path signed when opening an authenticated stream subscription.
pub const SUBSCRIBE_PATH: &str = "/users/self/subscribe";

/// Signer trait for request authentication
///
/// Signing is pure: the same inputs always produce the same signature, and
/// nothing here touches the network or the clock.
pub trait Signer: Send + Sync {
    /// Public key sent alongside every signature.
    fn api_key(&self) -> &str;

    /// Base64 signature over raw bytes.
    fn sign(&self, message: &[u8]) -> String;

    /// Sign a REST call
    ///
    /// # Arguments
    /// * `method` - HTTP method, upper case
    /// * `path` - Request path including the version prefix, without query
    /// * `timestamp` - Milliseconds since the Unix epoch, as sent in the header
    /// * `body` - Exact body bytes that go on the wire (empty for none)
    fn sign_request(&self, method: &str, path: &str, timestamp: &str, body: &[u8]) -> String {
        self.sign(&canonical_request(method, path, timestamp, body))
    }

    /// Sign a stream subscription stamped with `timestamp`.
    fn sign_subscription(&self, timestamp: &str) -> String {
        self.sign(canonical_subscription(timestamp).as_bytes())
    }
}

/// `method + path + timestamp + body`, concatenated without separators.
pub fn canonical_request(method: &str, path: &str, timestamp: &str, body: &[u8]) -> Vec<u8> {
    let mut message =
        Vec::with_capacity(method.len() + path.len() + timestamp.len() + body.len());
    message.extend_from_slice(method.as_bytes());
    message.extend_from_slice(path.as_bytes());
    message.extend_from_slice(timestamp.as_bytes());
    message.extend_from_slice(body);
    message
}

pub fn canonical_subscription(timestamp: &str) -> String {
    format!("{}\n{}", SUBSCRIBE_PATH, timestamp)
}

/// Current time in milliseconds, formatted for the timestamp header.
pub fn timestamp_millis() -> String {
    Utc::now().timestamp_millis().to_string()
}

/// HMAC-SHA512 signer keyed with the decoded API secret
pub struct HmacSigner {
    api_key: String,
    mac: HmacSha512,
}

impl HmacSigner {
    /// Create a new HMAC signer
    ///
    /// # Arguments
    /// * `api_key` - Public API key
    /// * `api_secret` - Base64-encoded private key; decoded once here
    pub fn new(api_key: impl Into<String>, api_secret: &str) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ConfigError::MissingCredentials("api key is empty".to_string()));
        }
        if api_secret.is_empty() {
            return Err(ConfigError::MissingCredentials(
                "api secret is empty".to_string(),
            ));
        }

        let key = Zeroizing::new(
            general_purpose::STANDARD
                .decode(api_secret)
                .map_err(|e| ConfigError::InvalidSecret(e.to_string()))?,
        );
        let mac = HmacSha512::new_from_slice(&key)
            .map_err(|e| ConfigError::InvalidSecret(e.to_string()))?;

        Ok(Self { api_key, mac })
    }
}

impl Signer for HmacSigner {
    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn sign(&self, message: &[u8]) -> String {
        let mut mac = self.mac.clone();
        mac.update(message);
        general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacSigner")
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "TXlTdXBlclNlY3JldEtleQ==";

    fn signer() -> HmacSigner {
        HmacSigner::new("test-key", SECRET).unwrap()
    }

    #[test]
    fn matches_known_vector() {
        let signature =
            signer().sign_request("GET", "/v3/accounts/me/trading-fees", "1257894000000", b"");
        assert_eq!(
            signature,
            "MbgRsg2A+uHLWoT1gRkknReAooeeAdonNBmbVaQ3fo0DrB2lJ6k7xMIHZ/kJa1H94A+ghbbF39zXIhUnYO5T8g=="
        );
    }

    #[test]
    fn signing_is_deterministic() {
        let signer = signer();
        let body = br#"{"marketId":"BTC-AUD"}"#;
        assert_eq!(
            signer.sign_request("POST", "/v3/orders", "1", body),
            signer.sign_request("POST", "/v3/orders", "1", body)
        );
    }

    #[test]
    fn every_input_changes_the_signature() {
        let signer = signer();
        let base = signer.sign_request("POST", "/v3/orders", "1000", b"{}");

        assert_ne!(base, signer.sign_request("GET", "/v3/orders", "1000", b"{}"));
        assert_ne!(base, signer.sign_request("POST", "/v3/order", "1000", b"{}"));
        assert_ne!(base, signer.sign_request("POST", "/v3/orders", "1001", b"{}"));
        assert_ne!(base, signer.sign_request("POST", "/v3/orders", "1000", b"{ }"));

        let other = HmacSigner::new("test-key", "b3RoZXItc2VjcmV0").unwrap();
        assert_ne!(base, other.sign_request("POST", "/v3/orders", "1000", b"{}"));
    }

    #[test]
    fn subscription_signs_path_and_timestamp() {
        let signer = signer();
        assert_eq!(canonical_subscription("42"), "/users/self/subscribe\n42");
        assert_eq!(
            signer.sign_subscription("42"),
            signer.sign(b"/users/self/subscribe\n42")
        );
    }

    #[test]
    fn rejects_invalid_credentials() {
        assert!(matches!(
            HmacSigner::new("", SECRET),
            Err(ConfigError::MissingCredentials(_))
        ));
        assert!(matches!(
            HmacSigner::new("key", "%%%"),
            Err(ConfigError::InvalidSecret(_))
        ));
    }

    #[test]
    fn debug_hides_key_material() {
        let rendered = format!("{:?}", signer());
        assert!(rendered.contains("test-key"));
        assert!(!rendered.contains(SECRET));
    }
}
