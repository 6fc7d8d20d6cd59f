//! Framework-neutral request and response types for callback endpoints.
//!
//! Web framework adapters implement [`WebhookExtractor`] for their request
//! type (or build a [`WebhookRequest`]), hand it to a dispatcher and write
//! the returned [`WebhookResponse`] out as JSON.

use serde_json::{Value, json};

/// Helper trait for extracting webhook data from HTTP requests.
pub trait WebhookExtractor {
    /// Returns a header value. Names are matched case-insensitively.
    fn header(&self, name: &str) -> Option<&str>;

    /// Returns the raw body bytes.
    fn body(&self) -> &[u8];
}

/// An owned callback request.
#[derive(Debug, Clone, Default)]
pub struct WebhookRequest {
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl WebhookRequest {
    /// Creates a request with the given body and no headers.
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Creates a request whose body is the serialized `payload`.
    pub fn json(payload: &Value) -> Self {
        Self::new(payload.to_string())
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds every header from an iterator of pairs.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

impl WebhookExtractor for WebhookRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn body(&self) -> &[u8] {
        &self.body
    }
}

/// What an adapter should answer the platform with.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookResponse {
    /// HTTP status code.
    pub status: u16,
    /// JSON body.
    pub body: Value,
}

impl WebhookResponse {
    /// A 200 response with the given body.
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    /// A 200 response with `{}` as its body.
    pub fn empty() -> Self {
        Self::ok(json!({}))
    }

    /// The answer to a URL verification handshake.
    pub fn challenge(challenge: &str) -> Self {
        Self::ok(json!({ "challenge": challenge }))
    }

    /// A 401 response with `{}` as its body.
    pub fn unauthorized() -> Self {
        Self {
            status: 401,
            body: json!({}),
        }
    }

    /// Returns true for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
