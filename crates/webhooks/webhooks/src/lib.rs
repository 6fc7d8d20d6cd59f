//! # Feishu Webhooks
//!
//! Receiving side of the open platform's callbacks:
//! - SHA-1 request signature verification
//! - AES-256-CBC decryption of encrypted callbacks
//! - Event and card action dispatchers with failure isolation
//!
//! ## Example
//!
//! ```rust,ignore
//! use feishu_webhooks::{EventDispatcher, FnHandler, WebhookConfig, WebhookRequest};
//!
//! let dispatcher = EventDispatcher::task(
//!     WebhookConfig::from_env(),
//!     FnHandler::new("log", |event: Event| async move {
//!         tracing::info!(uuid = %event.uuid, "received {}", event.event.event_type());
//!         Ok(())
//!     }),
//! );
//!
//! // In the web framework's route:
//! let response = dispatcher.handle(&WebhookRequest::new(body).headers(headers)).await;
//! ```

pub mod config;
pub mod crypto;
pub mod dispatcher;
pub mod handler;
pub mod receiver;
pub mod signature;

pub use config::WebhookConfig;
pub use crypto::{decrypt, encrypt};
pub use dispatcher::{ActionDispatcher, EventDispatcher, decode_payload};
pub use handler::{
    ActionHandler, BlockingEventHandler, BlockingFnHandler, EventHandler, FnHandler, HandlerError,
    HandlerResult,
};
pub use receiver::{WebhookExtractor, WebhookRequest, WebhookResponse};
pub use signature::{SignatureHeaders, sign, verify_request, verify_signature};
