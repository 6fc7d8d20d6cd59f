//! Error types for the Feishu SDK.
//!
//! This module defines the `FeishuError` enum which represents every failure
//! the request engine, token manager, credential stores and webhook pipeline
//! can report. Each variant maps to a stable numeric code so callers can
//! branch on `code()` the same way they would on a platform error.

use serde_json::Value;
use thiserror::Error;

/// The main error type for Feishu SDK operations.
#[derive(Debug, Error)]
pub enum FeishuError {
    // ==================== Transport Errors ====================
    /// The client has been closed and accepts no new requests.
    #[error("Client has been closed")]
    ClientClosed,

    /// The connection to the platform could not be established or broke.
    #[error("Failed to establish connection: {reason}")]
    ConnectionFailed { reason: String, timed_out: bool },

    /// The platform answered with a body that is not JSON.
    #[error("Unable to parse server response as JSON: {body}")]
    UnparsableResponse { body: String },

    /// Only GET and POST are supported by the platform endpoints.
    #[error("Unsupported request method: {method}")]
    UnsupportedMethod { method: String },

    // ==================== Platform Errors ====================
    /// The platform returned a non-zero code without a usable message.
    #[error("Unknown server error (code {code}): {body}")]
    UnknownServerError { code: i64, body: String },

    /// The platform rejected the request with its own code and message.
    #[error("Platform error {code}: {msg}")]
    Api { code: i64, msg: String },

    // ==================== Payload Errors ====================
    /// Uploaded image bytes are empty or not a recognised image format.
    #[error("Invalid image file or content: {reason}")]
    InvalidImageOrContent { reason: String },

    /// A payload with a known discriminator failed to deserialize.
    #[error("Validation error: {reason}")]
    Validation { reason: String, payload: Value },

    // ==================== Webhook Errors ====================
    /// An encrypted callback arrived but no encryption key is configured.
    #[error("Received an encrypted payload but no encrypt key is configured")]
    MissingEncryptKey,

    /// The encrypted payload could not be decrypted or decoded.
    #[error("Failed to decrypt payload: {reason}")]
    Decryption { reason: String },

    /// The request signature headers are missing or do not match.
    #[error("Invalid webhook signature")]
    InvalidSignature,

    // ==================== Infrastructure Errors ====================
    /// The credential store backend failed.
    #[error("Credential store error: {message}")]
    Store { message: String },

    /// The client or dispatcher configuration is invalid.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A scheduled task failed to complete (panicked or was cancelled).
    #[error("Task failed: {message}")]
    TaskFailed { message: String },
}

impl FeishuError {
    pub const CONNECTION_FAILED: i64 = -1;
    pub const UNPARSABLE_RESPONSE: i64 = -2;
    pub const UNKNOWN_SERVER_ERROR: i64 = -3;
    pub const UNSUPPORTED_METHOD: i64 = -4;
    pub const INVALID_IMAGE_OR_CONTENT: i64 = -5;
    pub const VALIDATION_ERROR: i64 = -6;
    pub const MISSING_ENCRYPT_KEY: i64 = -7;
    pub const CLIENT_CLOSED: i64 = -8;
    pub const DECRYPTION_FAILED: i64 = -9;
    pub const INVALID_SIGNATURE: i64 = -10;
    pub const STORE_ERROR: i64 = -11;
    pub const CONFIG_ERROR: i64 = -12;
    pub const TASK_FAILED: i64 = -13;

    /// Creates a new connection error.
    pub fn connection(reason: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            reason: reason.into(),
            timed_out: false,
        }
    }

    /// Creates a new timeout error.
    pub fn timeout(reason: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            reason: reason.into(),
            timed_out: true,
        }
    }

    /// Creates a new validation error carrying the offending payload.
    pub fn validation(reason: impl Into<String>, payload: Value) -> Self {
        Self::Validation {
            reason: reason.into(),
            payload,
        }
    }

    /// Creates a new decryption error.
    pub fn decryption(reason: impl Into<String>) -> Self {
        Self::Decryption {
            reason: reason.into(),
        }
    }

    /// Creates a new credential store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a new task failure.
    pub fn task(message: impl Into<String>) -> Self {
        Self::TaskFailed {
            message: message.into(),
        }
    }

    /// Returns the machine-readable code for this error.
    ///
    /// Platform errors return the platform's own code; locally raised
    /// errors return one of the negative constants above.
    pub fn code(&self) -> i64 {
        match self {
            Self::ConnectionFailed { .. } => Self::CONNECTION_FAILED,
            Self::UnparsableResponse { .. } => Self::UNPARSABLE_RESPONSE,
            Self::UnknownServerError { code, .. } => *code,
            Self::UnsupportedMethod { .. } => Self::UNSUPPORTED_METHOD,
            Self::Api { code, .. } => *code,
            Self::InvalidImageOrContent { .. } => Self::INVALID_IMAGE_OR_CONTENT,
            Self::Validation { .. } => Self::VALIDATION_ERROR,
            Self::MissingEncryptKey => Self::MISSING_ENCRYPT_KEY,
            Self::ClientClosed => Self::CLIENT_CLOSED,
            Self::Decryption { .. } => Self::DECRYPTION_FAILED,
            Self::InvalidSignature => Self::INVALID_SIGNATURE,
            Self::Store { .. } => Self::STORE_ERROR,
            Self::Config { .. } => Self::CONFIG_ERROR,
            Self::TaskFailed { .. } => Self::TASK_FAILED,
        }
    }

    /// Returns true if this error was reported by the platform itself.
    pub fn is_platform_error(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::UnknownServerError { .. })
    }

    /// Returns true for connection failures caused by a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectionFailed { timed_out: true, .. })
    }
}

/// A Result type alias using FeishuError.
pub type FeishuResult<T> = Result<T, FeishuError>;
