//! # Feishu Client
//!
//! Calling side of the open platform. One client type serves both calling
//! styles; the execution mode picked at build time decides whether calls
//! block or return futures.
//!
//! - Access tokens are fetched on demand, cached in a credential store and
//!   optionally renewed in the background
//! - Every response envelope is unwrapped into its payload or a
//!   [`FeishuError`](feishu_core::FeishuError)
//! - Typed wrappers for the auth, bot, message and card endpoints
//!
//! ## Example
//!
//! ```rust,ignore
//! use feishu_client::{ClientBuilder, Receiver};
//!
//! let client = ClientBuilder::new().build_blocking()?; // APP_ID / APP_SECRET
//! let message_id = client.message.send_text(Receiver::chat("oc_xxx"), "deploy finished")?;
//! ```

pub mod apis;
pub mod client;
pub mod mode;
pub mod renew;
pub mod request;
pub mod store;
pub mod token;
mod transport;

pub use apis::{AuthApi, BotApi, BotInfo, CardApi, ImageType, MessageApi, Receiver, detect_image};
pub use client::{ClientBuilder, FeishuClient};
pub use mode::{Blocking, ExecutionMode, NonBlocking, Pending};
pub use renew::RenewalPolicy;
pub use request::ApiRequest;
pub use store::BlockingStore;
pub use token::{TokenGrant, TokenKind, TokenManager, TokenSource};
