//! # Feishu Events
//!
//! Typed records for the callbacks the open platform delivers:
//! - Subscribed events wrapped in the `event_callback` envelope
//! - Interactive card actions
//! - A registry that classifies raw payloads by their `type`
//!
//! ## Example
//!
//! ```rust,ignore
//! use feishu_events::{classify, EventContent};
//!
//! match classify(payload)? {
//!     EventContent::TextMessage(msg) => println!("{}", msg.text_without_at_bot),
//!     EventContent::Unknown(raw) => println!("unhandled: {raw}"),
//!     _ => {}
//! }
//! ```

mod event;
pub mod model;
mod registry;

pub use event::{Event, EventContent, EVENT_CALLBACK, URL_VERIFICATION};
pub use model::card::{Action, CardAction};
pub use registry::{classify, is_registered, registered_types};
