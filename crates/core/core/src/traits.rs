//! Core traits for the Feishu SDK.
//!
//! This module defines the credential store interfaces that the token
//! manager caches access tokens in. Backends live in the adapter crates.

use async_trait::async_trait;
use std::sync::Arc;

use crate::consts::UPDATE_MARGIN_SECS;
use crate::error::FeishuResult;

/// Returns the lifetime an entry actually gets once the update margin is
/// taken off the declared ttl.
pub fn effective_ttl(ttl_secs: u64) -> u64 {
    ttl_secs.saturating_sub(UPDATE_MARGIN_SECS)
}

/// A key-value cache with per-entry expiry.
///
/// Implementations must treat an entry as absent once its effective expiry
/// (see [`effective_ttl`]) has passed, and must report backend failures as
/// errors rather than cache misses.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the stored value if present and not expired.
    async fn get(&self, key: &str) -> FeishuResult<Option<String>>;

    /// Stores a value that expires `ttl_secs` minus the update margin from now.
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> FeishuResult<()>;

    /// Removes a value. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> FeishuResult<()>;
}

/// A credential store whose backend only offers a blocking API.
///
/// Wrap it in the client's `BlockingStore` to use it with the async token
/// manager.
pub trait SyncCredentialStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> FeishuResult<Option<String>>;

    fn set(&self, key: &str, value: &str, ttl_secs: u64) -> FeishuResult<()>;

    fn remove(&self, key: &str) -> FeishuResult<()>;
}

#[async_trait]
impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    async fn get(&self, key: &str) -> FeishuResult<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> FeishuResult<()> {
        (**self).set(key, value, ttl_secs).await
    }

    async fn remove(&self, key: &str) -> FeishuResult<()> {
        (**self).remove(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_ttl_subtracts_margin() {
        assert_eq!(effective_ttl(7200), 6600);
        assert_eq!(effective_ttl(600), 0);
        assert_eq!(effective_ttl(30), 0);
    }
}
