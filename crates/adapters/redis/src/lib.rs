//! # Feishu Redis Store
//!
//! A credential store backed by Redis, for deployments where several
//! processes share one application's access token.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use feishu_store_redis::RedisStore;
//!
//! let store = RedisStore::connect("redis://localhost:6379").await?;
//! let client = ClientBuilder::new().store(store).build_async()?;
//! ```

use async_trait::async_trait;
use feishu_core::error::{FeishuError, FeishuResult};
use feishu_core::traits::{CredentialStore, effective_ttl};
use fred::prelude::*;

/// Credential store on top of a shared `fred` client.
///
/// Expiry is delegated to Redis through `EX`. A ttl that leaves nothing once
/// the update margin is subtracted deletes the key instead of writing it.
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
    prefix: String,
}

impl RedisStore {
    /// Wraps an already connected client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            prefix: String::new(),
        }
    }

    /// Connects to the server at `url` and waits for the connection.
    pub async fn connect(url: &str) -> FeishuResult<Self> {
        let config = Config::from_url(url).map_err(store_error)?;
        let client = Client::new(config, None, None, None);
        client.connect();
        client.wait_for_connect().await.map_err(store_error)?;

        tracing::info!("Connected to Redis credential store");
        Ok(Self::new(client))
    }

    /// Prepends `prefix` to every key written by this store.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

fn store_error(err: fred::error::Error) -> FeishuError {
    FeishuError::store(format!("redis: {err}"))
}

/// Converts a declared ttl into the `EX` argument, or `None` when the entry
/// would already be expired.
fn expiration_secs(ttl_secs: u64) -> Option<i64> {
    match effective_ttl(ttl_secs) {
        0 => None,
        secs => Some(i64::try_from(secs).unwrap_or(i64::MAX)),
    }
}

#[async_trait]
impl CredentialStore for RedisStore {
    async fn get(&self, key: &str) -> FeishuResult<Option<String>> {
        self.client
            .get::<Option<String>, _>(self.key(key))
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, key, "Failed to read credential from Redis");
                store_error(e)
            })
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> FeishuResult<()> {
        let full_key = self.key(key);
        match expiration_secs(ttl_secs) {
            Some(secs) => {
                let _: () = self
                    .client
                    .set(full_key, value, Some(Expiration::EX(secs)), None, false)
                    .await
                    .map_err(store_error)?;
            }
            None => {
                let _: () = self.client.del(full_key).await.map_err(store_error)?;
            }
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> FeishuResult<()> {
        let _: () = self.client.del(self.key(key)).await.map_err(store_error)?;
        Ok(())
    }
}
