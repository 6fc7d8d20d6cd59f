//! Dispatcher configuration.

use feishu_core::FeishuConfig;

/// Default number of blocking event handlers allowed to run at once.
pub const DEFAULT_POOL_SIZE: usize = 2;

/// Webhook dispatcher configuration.
#[derive(Clone)]
pub struct WebhookConfig {
    /// Verification token; when set, callbacks carrying another token are
    /// rejected and card actions must be signed with it.
    pub verify_token: Option<String>,
    /// Encrypt key; required to read encrypted callbacks.
    pub encrypt_key: Option<String>,
    /// Concurrency limit for blocking event handlers.
    pub pool_size: usize,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            verify_token: None,
            encrypt_key: None,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

impl WebhookConfig {
    /// Creates a new configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `FEISHU_VERIFY_TOKEN` and `FEISHU_ENCRYPT_KEY`.
    pub fn from_env() -> Self {
        Self::from(&FeishuConfig::from_env())
    }

    /// Sets the verification token.
    pub fn verify_token(mut self, token: impl Into<String>) -> Self {
        self.verify_token = Some(token.into());
        self
    }

    /// Sets the encrypt key.
    pub fn encrypt_key(mut self, key: impl Into<String>) -> Self {
        self.encrypt_key = Some(key.into());
        self
    }

    /// Sets the blocking handler concurrency limit (at least 1).
    pub fn pool_size(mut self, size: usize) -> Self {
        self.pool_size = size.max(1);
        self
    }

    pub(crate) fn verify_token_str(&self) -> Option<&str> {
        self.verify_token.as_deref().filter(|t| !t.is_empty())
    }

    pub(crate) fn encrypt_key_str(&self) -> Option<&str> {
        self.encrypt_key.as_deref().filter(|k| !k.is_empty())
    }
}

impl From<&FeishuConfig> for WebhookConfig {
    fn from(config: &FeishuConfig) -> Self {
        Self {
            verify_token: config.verify_token.clone(),
            encrypt_key: config.encrypt_key.clone(),
            ..Self::default()
        }
    }
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("verify_token", &self.verify_token.as_ref().map(|_| "<redacted>"))
            .field("encrypt_key", &self.encrypt_key.as_ref().map(|_| "<redacted>"))
            .field("pool_size", &self.pool_size)
            .finish()
    }
}
