//! SHA-1 request signature generation and verification.
//!
//! The platform signs a callback as
//! `hex(sha1(timestamp ‖ nonce ‖ secret ‖ body))` and sends the result in
//! the `X-Lark-Signature` header, next to the timestamp and nonce it used.

use feishu_core::consts::headers;
use feishu_core::{FeishuError, FeishuResult};
use sha1::{Digest, Sha1};

use crate::receiver::WebhookExtractor;

/// Computes the signature of a callback body.
pub fn sign(secret: &str, timestamp: &str, nonce: &str, body: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(timestamp.as_bytes());
    hasher.update(nonce.as_bytes());
    hasher.update(secret.as_bytes());
    hasher.update(body);
    hex::encode(hasher.finalize())
}

/// Verifies a callback signature.
pub fn verify_signature(
    secret: &str,
    timestamp: &str,
    nonce: &str,
    body: &[u8],
    signature: &str,
) -> bool {
    let expected = sign(secret, timestamp, nonce, body);
    constant_time_compare(&expected, signature)
}

/// The three signature headers of a callback request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureHeaders<'a> {
    pub timestamp: &'a str,
    pub nonce: &'a str,
    pub signature: &'a str,
}

impl<'a> SignatureHeaders<'a> {
    /// Reads the headers from a request; `None` if any of them is missing.
    pub fn from_request<E: WebhookExtractor + ?Sized>(request: &'a E) -> Option<Self> {
        Some(Self {
            timestamp: request.header(headers::REQUEST_TIMESTAMP)?,
            nonce: request.header(headers::REQUEST_NONCE)?,
            signature: request.header(headers::SIGNATURE)?,
        })
    }

    /// Checks these headers against `body`.
    pub fn verify(&self, secret: &str, body: &[u8]) -> FeishuResult<()> {
        if verify_signature(secret, self.timestamp, self.nonce, body, self.signature) {
            Ok(())
        } else {
            Err(FeishuError::InvalidSignature)
        }
    }
}

/// Verifies the signature headers of `request` against its body.
///
/// Missing headers are an [`FeishuError::InvalidSignature`].
pub fn verify_request<E: WebhookExtractor + ?Sized>(request: &E, secret: &str) -> FeishuResult<()> {
    SignatureHeaders::from_request(request)
        .ok_or(FeishuError::InvalidSignature)?
        .verify(secret, request.body())
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
