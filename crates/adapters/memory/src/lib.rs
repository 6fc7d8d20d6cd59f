//! # Feishu Memory Store
//!
//! An in-process credential store for the Feishu SDK. This is the default
//! store used by the client when no other backend is configured.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use feishu_store_memory::MemoryStore;
//!
//! let client = ClientBuilder::new()
//!     .app_id("cli_xxx")
//!     .app_secret("secret")
//!     .store(MemoryStore::new())
//!     .build_async()?;
//! ```

use async_trait::async_trait;
use feishu_core::error::FeishuResult;
use feishu_core::traits::{CredentialStore, effective_ttl};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-memory credential store.
///
/// Expiry is checked lazily on read; an expired entry is evicted by the
/// `get` that finds it. Entries are lost when the process exits.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Returns the number of entries held, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, key: &str) -> FeishuResult<Option<String>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        // Re-check under the write lock: a concurrent set may have replaced it.
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
            tracing::debug!(key, "evicted expired credential");
            return Ok(None);
        }
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> FeishuResult<()> {
        let expires_at = Instant::now() + Duration::from_secs(effective_ttl(ttl_secs));
        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> FeishuResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
