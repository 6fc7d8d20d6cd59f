//! # Feishu Core
//!
//! This crate provides the foundational types and traits for the Feishu SDK.
//! It defines the error taxonomy, the shared configuration, the platform
//! response envelope and the credential store interfaces that adapters
//! implement.

pub mod config;
pub mod consts;
pub mod envelope;
pub mod error;
pub mod traits;

// Re-export commonly used items at the crate root
pub use config::FeishuConfig;
pub use envelope::{Envelope, unwrap_envelope};
pub use error::{FeishuError, FeishuResult};
pub use traits::{CredentialStore, SyncCredentialStore, effective_ttl};
