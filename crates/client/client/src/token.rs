//! Access token acquisition and caching.

use async_trait::async_trait;
use feishu_core::consts::{TOKEN_EXPIRE_SECS, paths};
use feishu_core::{CredentialStore, FeishuError, FeishuResult};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::{Arc, OnceLock, Weak};
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;

use crate::renew::RenewalPolicy;
use crate::request::ApiRequest;
use crate::transport::HttpTransport;

/// Platform codes meaning the access token sent was not accepted.
const REJECTED_TOKEN_CODES: [i64; 2] = [99991663, 99991664];

/// Which access token the client authenticates with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    #[default]
    Tenant,
    App,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tenant => "tenant",
            Self::App => "app",
        }
    }

    /// Endpoint path issuing this kind of token.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Tenant => paths::TENANT_ACCESS_TOKEN,
            Self::App => paths::APP_ACCESS_TOKEN,
        }
    }

    /// Field of the token response carrying the token.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Tenant => "tenant_access_token",
            Self::App => "app_access_token",
        }
    }
}

/// A freshly issued token and its declared lifetime in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub token: String,
    pub expire: u64,
}

impl TokenGrant {
    /// Reads a grant from an unwrapped token endpoint response.
    pub fn from_response(kind: TokenKind, data: &Value) -> FeishuResult<Self> {
        let token = data
            .get(kind.field())
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                FeishuError::validation(
                    format!("token response has no {}", kind.field()),
                    data.clone(),
                )
            })?;
        let expire = data
            .get("expire")
            .and_then(Value::as_u64)
            .unwrap_or(TOKEN_EXPIRE_SECS);

        Ok(Self {
            token: token.to_string(),
            expire,
        })
    }
}

/// Builds the unauthenticated request issuing a `kind` token.
pub fn token_request(kind: TokenKind, app_id: &str, app_secret: &str) -> ApiRequest {
    ApiRequest::post(kind.path())
        .json(json!({"app_id": app_id, "app_secret": app_secret}))
        .without_auth()
}

/// Issues access tokens.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch(&self, kind: TokenKind) -> FeishuResult<TokenGrant>;
}

/// Asks the platform's token endpoints with the app credentials.
pub(crate) struct HttpTokenSource {
    transport: Arc<HttpTransport>,
    app_id: String,
    app_secret: String,
}

impl HttpTokenSource {
    pub(crate) fn new(
        transport: Arc<HttpTransport>,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        }
    }
}

#[async_trait]
impl TokenSource for HttpTokenSource {
    async fn fetch(&self, kind: TokenKind) -> FeishuResult<TokenGrant> {
        let request = token_request(kind, &self.app_id, &self.app_secret);
        let data = self.transport.send(&request, None).await?;
        TokenGrant::from_response(kind, &data)
    }
}

/// Keeps one access token cached in a credential store.
///
/// Concurrent cache misses are collapsed into a single fetch. With a
/// [`RenewalPolicy`] the token is also refreshed in the background before
/// it expires.
pub struct TokenManager {
    kind: TokenKind,
    key: String,
    source: Arc<dyn TokenSource>,
    store: Arc<dyn CredentialStore>,
    refresh_lock: Mutex<()>,
    renewal: Option<(RenewalPolicy, Handle)>,
    renewal_task: OnceLock<AbortHandle>,
    this: Weak<TokenManager>,
}

impl TokenManager {
    /// Creates a manager caching `kind` tokens of `app_id` in `store`.
    pub fn new(
        kind: TokenKind,
        app_id: &str,
        source: Arc<dyn TokenSource>,
        store: Arc<dyn CredentialStore>,
    ) -> Arc<Self> {
        Self::build(kind, app_id, source, store, None)
    }

    /// Like [`TokenManager::new`], renewing the token on `handle` after the
    /// first successful fetch.
    pub fn with_renewal(
        kind: TokenKind,
        app_id: &str,
        source: Arc<dyn TokenSource>,
        store: Arc<dyn CredentialStore>,
        policy: RenewalPolicy,
        handle: Handle,
    ) -> Arc<Self> {
        Self::build(kind, app_id, source, store, Some((policy, handle)))
    }

    fn build(
        kind: TokenKind,
        app_id: &str,
        source: Arc<dyn TokenSource>,
        store: Arc<dyn CredentialStore>,
        renewal: Option<(RenewalPolicy, Handle)>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            kind,
            key: format!("feishu:{}:{}", kind.as_str(), app_id),
            source,
            store,
            refresh_lock: Mutex::new(()),
            renewal,
            renewal_task: OnceLock::new(),
            this: this.clone(),
        })
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Store key the token is cached under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns a valid token, fetching one on a cache miss.
    pub async fn token(&self) -> FeishuResult<String> {
        if let Some(token) = self.store.get(&self.key).await? {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;
        // Another caller may have fetched while we waited
        if let Some(token) = self.store.get(&self.key).await? {
            return Ok(token);
        }
        Ok(self.fetch_and_store().await?.token)
    }

    /// Fetches a new token even if a cached one is still valid.
    pub async fn refresh(&self) -> FeishuResult<TokenGrant> {
        let _guard = self.refresh_lock.lock().await;
        self.fetch_and_store().await
    }

    /// Drops the cached token so the next call fetches a new one.
    pub async fn invalidate(&self) -> FeishuResult<()> {
        tracing::debug!(key = %self.key, "Access token invalidated");
        self.store.remove(&self.key).await
    }

    /// Drops the cached token if `err` says the platform refused it.
    pub(crate) async fn invalidate_on_rejection(&self, err: &FeishuError) {
        if let FeishuError::Api { code, .. } = err {
            if REJECTED_TOKEN_CODES.contains(code) {
                if let Err(e) = self.invalidate().await {
                    tracing::warn!(error = %e, "Failed to invalidate rejected token");
                }
            }
        }
    }

    /// Stops background renewal, if it was started.
    pub fn stop_renewal(&self) {
        if let Some(task) = self.renewal_task.get() {
            task.abort();
        }
    }

    /// Returns true while a renewal task is running.
    pub fn is_renewing(&self) -> bool {
        self.renewal_task.get().is_some_and(|task| !task.is_finished())
    }

    async fn fetch_and_store(&self) -> FeishuResult<TokenGrant> {
        let grant = self.source.fetch(self.kind).await?;
        self.store.set(&self.key, &grant.token, grant.expire).await?;
        tracing::info!(kind = self.kind.as_str(), expire = grant.expire, "Access token refreshed");

        if let Some((policy, handle)) = &self.renewal {
            self.renewal_task.get_or_init(|| {
                crate::renew::spawn(handle, policy.clone(), self.this.clone(), grant.expire)
            });
        }
        Ok(grant)
    }
}

impl Drop for TokenManager {
    fn drop(&mut self) {
        self.stop_renewal();
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("kind", &self.kind)
            .field("key", &self.key)
            .field("renewing", &self.is_renewing())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feishu_store_memory::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TokenSource for CountingSource {
        async fn fetch(&self, _kind: TokenKind) -> FeishuResult<TokenGrant> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::task::yield_now().await;
            Ok(TokenGrant {
                token: format!("t-{n}"),
                expire: 7200,
            })
        }
    }

    fn manager() -> (Arc<TokenManager>, Arc<CountingSource>, MemoryStore) {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let store = MemoryStore::new();
        let manager = TokenManager::new(
            TokenKind::Tenant,
            "cli_1",
            source.clone(),
            Arc::new(store.clone()),
        );
        (manager, source, store)
    }

    #[test]
    fn test_grant_from_response() {
        let grant = TokenGrant::from_response(
            TokenKind::Tenant,
            &json!({"tenant_access_token": "t-abc", "expire": 3600}),
        )
        .unwrap();
        assert_eq!(grant.token, "t-abc");
        assert_eq!(grant.expire, 3600);

        let grant =
            TokenGrant::from_response(TokenKind::App, &json!({"app_access_token": "a"})).unwrap();
        assert_eq!(grant.expire, TOKEN_EXPIRE_SECS);

        let err = TokenGrant::from_response(TokenKind::App, &json!({"tenant_access_token": "t"}))
            .unwrap_err();
        assert_eq!(err.code(), FeishuError::VALIDATION_ERROR);
    }

    #[tokio::test]
    async fn test_token_is_cached() {
        let (manager, source, _) = manager();
        assert_eq!(manager.key(), "feishu:tenant:cli_1");

        assert_eq!(manager.token().await.unwrap(), "t-1");
        assert_eq!(manager.token().await.unwrap(), "t-1");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_misses_fetch_once() {
        let (manager, source, _) = manager();

        let a = tokio::spawn({
            let manager = manager.clone();
            async move { manager.token().await }
        });
        let b = tokio::spawn({
            let manager = manager.clone();
            async move { manager.token().await }
        });

        assert_eq!(a.await.unwrap().unwrap(), "t-1");
        assert_eq!(b.await.unwrap().unwrap(), "t-1");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_refetched_after_margin() {
        let (manager, source, _) = manager();
        manager.token().await.unwrap();

        // 7200 s declared, cached for 7200 - 600
        tokio::time::advance(std::time::Duration::from_secs(6599)).await;
        assert_eq!(manager.token().await.unwrap(), "t-1");
        tokio::time::advance(std::time::Duration::from_secs(1)).await;
        assert_eq!(manager.token().await.unwrap(), "t-2");
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_on_rejection() {
        let (manager, source, store) = manager();
        manager.token().await.unwrap();

        let unrelated = FeishuError::Api {
            code: 10003,
            msg: "bad".into(),
        };
        manager.invalidate_on_rejection(&unrelated).await;
        assert_eq!(store.len().await, 1);

        let rejected = FeishuError::Api {
            code: 99991663,
            msg: "invalid tenant access token".into(),
        };
        manager.invalidate_on_rejection(&rejected).await;
        assert!(store.is_empty().await);

        assert_eq!(manager.token().await.unwrap(), "t-2");
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    struct UnreachableStore;

    #[async_trait]
    impl CredentialStore for UnreachableStore {
        async fn get(&self, _key: &str) -> FeishuResult<Option<String>> {
            Err(FeishuError::store("connection refused"))
        }

        async fn set(&self, _key: &str, _value: &str, _ttl_secs: u64) -> FeishuResult<()> {
            Err(FeishuError::store("connection refused"))
        }

        async fn remove(&self, _key: &str) -> FeishuResult<()> {
            Err(FeishuError::store("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_not_a_cache_miss() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let manager = TokenManager::new(
            TokenKind::Tenant,
            "cli_1",
            source.clone(),
            Arc::new(UnreachableStore),
        );

        let err = manager.token().await.unwrap_err();
        assert_eq!(err.code(), FeishuError::STORE_ERROR);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }
}
