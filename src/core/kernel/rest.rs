use crate::core::errors::{BtcMarketsError, Result};
use crate::core::kernel::rate_limit::RateLimiter;
use crate::core::kernel::signer::{timestamp_millis, Signer};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_CHARSET, CONTENT_TYPE, USER_AGENT,
};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};

pub const DEFAULT_USER_AGENT: &str = concat!("btcmarkets-rs/", env!("CARGO_PKG_VERSION"));

pub const HEADER_API_KEY: &str = "bm-auth-apikey";
pub const HEADER_TIMESTAMP: &str = "bm-auth-timestamp";
pub const HEADER_SIGNATURE: &str = "bm-auth-signature";

/// Placeholder for requests that carry no body.
pub const NO_BODY: Option<&()> = None;

/// A fully resolved, not yet sent, API call.
///
/// The body is serialized once, at construction; the same bytes are signed
/// and sent.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Body bytes, empty when the request has none.
    pub fn body(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default()
    }

    /// Append URL-encoded query parameters.
    pub fn with_query<K, V>(mut self, params: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if !params.is_empty() {
            self.url.query_pairs_mut().extend_pairs(params);
        }
        self
    }

    /// Attach the authentication headers for `timestamp`.
    ///
    /// The signed path is the URL path including the version prefix; the
    /// query string is not part of the signature.
    pub fn sign(&mut self, signer: &dyn Signer, timestamp: &str) -> Result<()> {
        let signature =
            signer.sign_request(self.method.as_str(), self.url.path(), timestamp, self.body());

        self.headers
            .insert(HeaderName::from_static(HEADER_API_KEY), header_value(signer.api_key())?);
        self.headers
            .insert(HeaderName::from_static(HEADER_TIMESTAMP), header_value(timestamp)?);
        self.headers
            .insert(HeaderName::from_static(HEADER_SIGNATURE), header_value(&signature)?);
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.headers
            .insert(ACCEPT_CHARSET, HeaderValue::from_static("UTF-8"));
        Ok(())
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| BtcMarketsError::InvalidParameters(format!("invalid header value: {}", e)))
}

/// Resolve `path` against `base`, keeping every segment of the base path.
///
/// `/markets` against `https://host/v3` gives `https://host/v3/markets`;
/// empty segments are dropped and the query string is carried over.
pub fn join_url(base: &Url, path: &str) -> Result<Url> {
    let mut root = base.clone();
    root.set_path("/");
    root.set_query(None);
    let resolved = root
        .join(path)
        .map_err(|e| BtcMarketsError::MalformedUrl(format!("{}: {}", path, e)))?;
    if resolved.origin() != base.origin() {
        return Err(BtcMarketsError::MalformedUrl(format!(
            "{}: resolves outside {}",
            path,
            base.origin().ascii_serialization()
        )));
    }

    let segments: Vec<&str> = base
        .path()
        .split('/')
        .chain(resolved.path().split('/'))
        .filter(|segment| !segment.is_empty())
        .collect();

    let mut url = base.clone();
    url.set_path(&format!("/{}", segments.join("/")));
    url.set_query(resolved.query());
    url.set_fragment(None);
    Ok(url)
}

/// HTTP transport shared by every service: builds, signs, throttles and
/// decodes API calls.
pub struct ReqwestRest {
    client: Client,
    base_url: Url,
    user_agent: HeaderValue,
    signer: Arc<dyn Signer>,
    limiter: Arc<RateLimiter>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for ReqwestRest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestRest")
            .field("base_url", &self.base_url.as_str())
            .field("user_agent", &self.user_agent)
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}

impl ReqwestRest {
    /// Create a new `ReqwestRest` instance
    ///
    /// # Arguments
    /// * `client` - Underlying HTTP client
    /// * `base_url` - API root including the version, e.g. `https://api.btcmarkets.net/v3`
    /// * `user_agent` - Value of the `User-Agent` header on every call
    /// * `signer` - Signs authenticated calls
    /// * `limiter` - Permit source consulted before every call
    pub fn new(
        client: Client,
        base_url: Url,
        user_agent: &str,
        signer: Arc<dyn Signer>,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self> {
        Ok(Self {
            client,
            base_url,
            user_agent: header_value(user_agent)?,
            signer,
            limiter,
            cancel: CancellationToken::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Token that aborts pending rate-limit waits when cancelled.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Build a request for `path` relative to the API root.
    ///
    /// When `body` is present it is serialized to JSON here; no request is
    /// returned if that fails.
    pub fn new_request<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<ApiRequest>
    where
        B: Serialize + ?Sized,
    {
        let url = join_url(&self.base_url, path)?;
        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| BtcMarketsError::Serialization(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, self.user_agent.clone());
        if body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        Ok(ApiRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Send without authentication and decode the JSON response.
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let bytes = self.execute_raw(request, false).await?;
        decode(&bytes)
    }

    /// Sign with a fresh timestamp, send, and decode the JSON response.
    pub async fn execute_authenticated<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let bytes = self.execute_raw(request, true).await?;
        decode(&bytes)
    }

    /// Send and return the raw 2xx body.
    #[instrument(
        skip(self, request),
        fields(method = %request.method, path = %request.url.path())
    )]
    pub async fn execute_raw(&self, mut request: ApiRequest, authenticated: bool) -> Result<Vec<u8>> {
        self.limiter.wait(&self.cancel).await?;

        if authenticated {
            request.sign(self.signer.as_ref(), &timestamp_millis())?;
        }

        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        trace!("Response body: {}", String::from_utf8_lossy(&bytes));

        if status.is_success() {
            Ok(bytes.to_vec())
        } else {
            debug!(status = status.as_u16(), "Request rejected");
            Err(BtcMarketsError::Api {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            })
        }
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    // Empty 2xx bodies decode like JSON `null`, so `()` and `Option<_>` targets accept them.
    let bytes = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        bytes
    };
    serde_json::from_slice(bytes).map_err(|e| BtcMarketsError::Decode(e.to_string()))
}
