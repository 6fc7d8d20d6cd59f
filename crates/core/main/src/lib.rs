//! # Feishu
//!
//! Rust SDK for the Feishu (Lark) open platform.
//!
//! The pieces live in their own crates and are re-exported here:
//! - [`client`]: blocking and async platform client with token caching
//! - [`events`]: typed event and card action records
//! - [`webhooks`]: signature checks, decryption and callback dispatch
//! - [`store`]: credential store backends
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use feishu::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> FeishuResult<()> {
//!     let client = ClientBuilder::new()
//!         .app_id("cli_xxx")
//!         .app_secret("secret")
//!         .build_async()?;
//!
//!     let bot = client.bot.info().await?;
//!     client
//!         .message
//!         .send_text(Receiver::chat("oc_xxx"), format!("{} is online", bot.app_name))
//!         .await?;
//!
//!     client.close().await
//! }
//! ```

// Re-export core types
pub use feishu_core::*;

pub use feishu_client as client;
pub use feishu_events as events;
pub use feishu_webhooks as webhooks;

/// Credential store backends.
pub mod store {
    pub use feishu_client::BlockingStore;
    pub use feishu_store_memory::MemoryStore;
    #[cfg(feature = "redis")]
    pub use feishu_store_redis::RedisStore;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use feishu_client::{
        ApiRequest, Blocking, ClientBuilder, FeishuClient, NonBlocking, Receiver, RenewalPolicy,
    };
    pub use feishu_core::error::{FeishuError, FeishuResult};
    pub use feishu_core::traits::CredentialStore;
    pub use feishu_core::FeishuConfig;
    pub use feishu_events::{CardAction, Event, EventContent};
    pub use feishu_store_memory::MemoryStore;
    pub use feishu_webhooks::{
        ActionDispatcher, BlockingFnHandler, EventDispatcher, FnHandler, HandlerResult,
        WebhookConfig, WebhookRequest, WebhookResponse,
    };
}
