//! The client and its builder.

use feishu_core::{CredentialStore, FeishuConfig, FeishuError, FeishuResult, SyncCredentialStore};
use feishu_store_memory::MemoryStore;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::apis::{AuthApi, BotApi, CardApi, MessageApi};
use crate::mode::{Blocking, ExecutionMode, NonBlocking};
use crate::renew::RenewalPolicy;
use crate::request::ApiRequest;
use crate::store::BlockingStore;
use crate::token::{HttpTokenSource, TokenKind, TokenManager};
use crate::transport::HttpTransport;

/// State shared by a client and all its API groups.
pub(crate) struct Core {
    config: FeishuConfig,
    transport: Arc<HttpTransport>,
    tokens: Arc<TokenManager>,
}

impl Core {
    pub(crate) fn config(&self) -> &FeishuConfig {
        &self.config
    }

    /// Sends a request and unwraps the platform envelope.
    pub(crate) async fn request(&self, request: ApiRequest) -> FeishuResult<Value> {
        let token = self.authorize(&request).await?;
        let result = self.transport.send(&request, token.as_deref()).await;
        if let (Err(e), Some(_)) = (&result, &token) {
            self.tokens.invalidate_on_rejection(e).await;
        }
        result
    }

    /// Sends a request and returns the raw body.
    pub(crate) async fn fetch(&self, request: ApiRequest) -> FeishuResult<Vec<u8>> {
        let token = self.authorize(&request).await?;
        self.transport.fetch(&request, token.as_deref()).await
    }

    pub(crate) async fn token(&self) -> FeishuResult<String> {
        self.ensure_open()?;
        self.tokens.token().await
    }

    async fn authorize(&self, request: &ApiRequest) -> FeishuResult<Option<String>> {
        self.ensure_open()?;
        if !request.requires_auth() {
            return Ok(None);
        }
        self.tokens.token().await.map(Some)
    }

    fn ensure_open(&self) -> FeishuResult<()> {
        if self.transport.is_closed() {
            return Err(FeishuError::ClientClosed);
        }
        Ok(())
    }

    /// Refuses further calls and stops renewal without waiting on anything.
    fn mark_closed(&self) {
        self.tokens.stop_renewal();
        if self.transport.mark_closed() {
            tracing::info!(app_id = %self.config.app_id, "Client closed");
        }
    }

    async fn close(&self) {
        self.mark_closed();
        self.transport.close().await;
    }
}

/// Handle an API group uses to run calls in the client's mode.
#[derive(Clone)]
pub(crate) struct Shared<M> {
    core: Arc<Core>,
    mode: M,
}

impl<M: ExecutionMode> Shared<M> {
    /// Runs `body` with the core in the client's mode.
    pub(crate) fn call<T, F, Fut>(&self, body: F) -> M::Output<T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<Core>) -> Fut,
        Fut: Future<Output = FeishuResult<T>> + Send + 'static,
    {
        self.mode.run(body(Arc::clone(&self.core)))
    }
}

/// Client for the Feishu open platform.
///
/// The mode fixes how calls return: `FeishuClient<Blocking>` returns
/// results directly, `FeishuClient<NonBlocking>` returns futures.
///
/// ```rust,ignore
/// let client = ClientBuilder::new()
///     .app_id("cli_xxx")
///     .app_secret("secret")
///     .build_async()?;
///
/// let bot = client.bot.info().await?;
/// client.message.send_text(Receiver::open_id("ou_xxx"), "hello").await?;
/// ```
#[derive(Clone)]
pub struct FeishuClient<M: ExecutionMode = NonBlocking> {
    pub auth: AuthApi<M>,
    pub bot: BotApi<M>,
    pub message: MessageApi<M>,
    pub card: CardApi<M>,
    shared: Shared<M>,
}

impl<M: ExecutionMode> FeishuClient<M> {
    /// Sends any platform request and returns its unwrapped payload.
    pub fn request(&self, request: ApiRequest) -> M::Output<Value> {
        self.shared
            .call(move |core| async move { core.request(request).await })
    }

    /// Sends a request and returns the raw response body.
    pub fn fetch(&self, request: ApiRequest) -> M::Output<Vec<u8>> {
        self.shared
            .call(move |core| async move { core.fetch(request).await })
    }

    /// Returns the current access token, fetching one if needed.
    pub fn token(&self) -> M::Output<String> {
        self.shared.call(|core| async move { core.token().await })
    }

    /// Drops the cached access token.
    pub fn invalidate_token(&self) -> M::Output<()> {
        self.shared
            .call(|core| async move { core.tokens.invalidate().await })
    }

    /// Closes the client. Later calls fail with [`FeishuError::ClientClosed`];
    /// calls already running are not interrupted.
    ///
    /// The client counts as closed as soon as this returns; the returned
    /// output only covers releasing the HTTP session.
    pub fn close(&self) -> M::Output<()> {
        self.shared.core.mark_closed();
        self.shared.call(|core| async move {
            core.close().await;
            Ok(())
        })
    }

    pub fn is_closed(&self) -> bool {
        self.shared.core.transport.is_closed()
    }

    pub fn config(&self) -> &FeishuConfig {
        self.shared.core.config()
    }

    pub fn token_manager(&self) -> &Arc<TokenManager> {
        &self.shared.core.tokens
    }
}

impl<M: ExecutionMode> std::fmt::Debug for FeishuClient<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeishuClient")
            .field("config", self.config())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Builds a [`FeishuClient`].
///
/// Values set here win over the environment (`APP_ID`, `APP_SECRET`, ...),
/// which only fills what is left unset.
pub struct ClientBuilder {
    config: FeishuConfig,
    store: Option<Arc<dyn CredentialStore>>,
    token_kind: TokenKind,
    renewal: Option<RenewalPolicy>,
    env_fallback: bool,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            config: FeishuConfig::default(),
            store: None,
            token_kind: TokenKind::default(),
            renewal: None,
            env_fallback: true,
        }
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration.
    pub fn from_config(config: FeishuConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.config = self.config.app_id(app_id);
        self
    }

    pub fn app_secret(mut self, app_secret: impl Into<String>) -> Self {
        self.config = self.config.app_secret(app_secret);
        self
    }

    /// Sets the platform base URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config = self.config.endpoint(endpoint);
        self
    }

    /// Sets the overall request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Caches tokens in `store` instead of process memory.
    pub fn store(mut self, store: impl CredentialStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Caches tokens in a store that only has a blocking API.
    pub fn blocking_store(self, store: impl SyncCredentialStore) -> Self {
        self.store(BlockingStore::new(store))
    }

    /// Selects the access token kind. Defaults to the tenant token.
    pub fn token_kind(mut self, kind: TokenKind) -> Self {
        self.token_kind = kind;
        self
    }

    /// Renews the access token in the background.
    pub fn renewal(mut self, policy: RenewalPolicy) -> Self {
        self.renewal = Some(policy);
        self
    }

    /// Ignores the process environment.
    pub fn without_env(mut self) -> Self {
        self.env_fallback = false;
        self
    }

    /// Builds a client whose calls return results directly.
    ///
    /// Must not be called from inside an async context.
    pub fn build_blocking(self) -> FeishuResult<FeishuClient<Blocking>> {
        self.build_with(Blocking::new()?)
    }

    /// Builds a client whose calls return futures, running on the current
    /// tokio runtime.
    pub fn build_async(self) -> FeishuResult<FeishuClient<NonBlocking>> {
        self.build_with(NonBlocking::current()?)
    }

    /// Builds a client in the given mode.
    pub fn build_with<M: ExecutionMode>(self, mode: M) -> FeishuResult<FeishuClient<M>> {
        let config = if self.env_fallback {
            self.config.with_env_fallback()
        } else {
            self.config
        };
        config.validate()?;

        let transport = Arc::new(HttpTransport::new(&config));
        let source = Arc::new(HttpTokenSource::new(
            Arc::clone(&transport),
            &config.app_id,
            &config.app_secret,
        ));
        let store: Arc<dyn CredentialStore> = match self.store {
            Some(store) => store,
            None => Arc::new(MemoryStore::new()),
        };
        let tokens = match self.renewal {
            Some(policy) => TokenManager::with_renewal(
                self.token_kind,
                &config.app_id,
                source,
                store,
                policy,
                mode.handle(),
            ),
            None => TokenManager::new(self.token_kind, &config.app_id, source, store),
        };

        tracing::debug!(
            app_id = %config.app_id,
            endpoint = config.normalized_endpoint(),
            token_kind = self.token_kind.as_str(),
            "Client created"
        );

        let shared = Shared {
            core: Arc::new(Core {
                config,
                transport,
                tokens,
            }),
            mode,
        };
        Ok(FeishuClient {
            auth: AuthApi::new(shared.clone()),
            bot: BotApi::new(shared.clone()),
            message: MessageApi::new(shared.clone()),
            card: CardApi::new(shared.clone()),
            shared,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_credentials() {
        let err = ClientBuilder::new()
            .without_env()
            .build_blocking()
            .unwrap_err();
        assert_eq!(err.code(), FeishuError::CONFIG_ERROR);
    }

    #[tokio::test]
    async fn test_explicit_values_win() {
        let client = ClientBuilder::new()
            .app_id("cli_explicit")
            .app_secret("secret")
            .endpoint("http://localhost:8080/open-apis/")
            .build_async()
            .unwrap();

        assert_eq!(client.config().app_id, "cli_explicit");
        assert_eq!(client.config().normalized_endpoint(), "http://localhost:8080/open-apis");
        assert_eq!(client.token_manager().key(), "feishu:tenant:cli_explicit");
    }

    #[tokio::test]
    async fn test_closed_client_fails_fast() {
        let client = ClientBuilder::new()
            .app_id("cli_1")
            .app_secret("secret")
            .endpoint("http://127.0.0.1:9")
            .without_env()
            .build_async()
            .unwrap();

        client.close().await.unwrap();
        assert!(client.is_closed());

        let err = client.request(ApiRequest::get("/bot/v3/info/")).await.unwrap_err();
        assert!(matches!(err, FeishuError::ClientClosed));
        let err = client.token().await.unwrap_err();
        assert!(matches!(err, FeishuError::ClientClosed));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_close_takes_effect_before_its_future_resolves() {
        let client = ClientBuilder::new()
            .app_id("cli_1")
            .app_secret("secret")
            .endpoint("http://127.0.0.1:9")
            .without_env()
            .build_async()
            .unwrap();

        let closing = client.close();
        assert!(client.is_closed());
        let err = client.token().await.unwrap_err();
        assert!(matches!(err, FeishuError::ClientClosed));

        closing.await.unwrap();
        assert!(client.is_closed());
    }
}
