//! Application credentials and endpoint configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::consts::{self, env};
use crate::error::{FeishuError, FeishuResult};

/// Configuration shared by the client and the webhook dispatchers.
///
/// Values given explicitly always win; missing ones can be filled from the
/// process environment with [`FeishuConfig::with_env_fallback`].
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeishuConfig {
    /// Application id of the self-built app.
    pub app_id: String,
    /// Application secret of the self-built app.
    pub app_secret: String,
    /// Verification token configured in the event subscription console.
    pub verify_token: Option<String>,
    /// Encrypt key configured in the event subscription console.
    pub encrypt_key: Option<String>,
    /// Base URL of the open platform.
    pub endpoint: String,
    /// Overall request timeout in seconds.
    pub timeout_secs: f64,
}

impl Default for FeishuConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_secret: String::new(),
            verify_token: None,
            encrypt_key: None,
            endpoint: consts::DEFAULT_ENDPOINT.to_string(),
            timeout_secs: consts::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl FeishuConfig {
    /// Creates a new configuration with the given credentials.
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            ..Default::default()
        }
    }

    /// Builds a configuration purely from environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_fallback()
    }

    /// Fills every unset value from the process environment.
    pub fn with_env_fallback(self) -> Self {
        self.with_fallback(|name| std::env::var(name).ok())
    }

    /// Fills every unset value from the given lookup function.
    pub fn with_fallback(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if self.app_id.is_empty() {
            self.app_id = read(env::APP_ID).unwrap_or_default();
        }
        if self.app_secret.is_empty() {
            self.app_secret = read(env::APP_SECRET).unwrap_or_default();
        }
        if self.verify_token.as_deref().is_none_or(str::is_empty) {
            self.verify_token = read(env::VERIFY_TOKEN);
        }
        if self.encrypt_key.as_deref().is_none_or(str::is_empty) {
            self.encrypt_key = read(env::ENCRYPT_KEY);
        }
        self
    }

    /// Sets the application id.
    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = app_id.into();
        self
    }

    /// Sets the application secret.
    pub fn app_secret(mut self, app_secret: impl Into<String>) -> Self {
        self.app_secret = app_secret.into();
        self
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

    /// Sets the base URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the overall request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs_f64();
        self
    }

    /// Returns the base URL with trailing slashes stripped.
    pub fn normalized_endpoint(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }

    /// Returns the overall request timeout.
    ///
    /// A timeout that [`validate`](Self::validate) would reject maps to zero.
    pub fn timeout_duration(&self) -> Duration {
        self.checked_timeout().unwrap_or(Duration::ZERO)
    }

    fn checked_timeout(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.timeout_secs)
            .ok()
            .filter(|timeout| !timeout.is_zero())
    }

    /// Checks that the credentials needed to call the platform are present.
    pub fn validate(&self) -> FeishuResult<()> {
        if self.app_id.is_empty() || self.app_secret.is_empty() {
            return Err(FeishuError::config(format!(
                "app_id and app_secret are required (or set {} / {})",
                env::APP_ID,
                env::APP_SECRET
            )));
        }
        if self.checked_timeout().is_none() {
            return Err(FeishuError::config("timeout must be a positive number of seconds"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for FeishuConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("FeishuConfig")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .field("verify_token", &redact(&self.verify_token))
            .field("encrypt_key", &redact(&self.encrypt_key))
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_explicit_values_win_over_env() {
        let config = FeishuConfig::new("cli_explicit", "secret")
            .with_fallback(lookup(&[("APP_ID", "cli_env"), ("FEISHU_ENCRYPT_KEY", " key ")]));

        assert_eq!(config.app_id, "cli_explicit");
        assert_eq!(config.encrypt_key.as_deref(), Some("key"));
        assert!(config.verify_token.is_none());
    }

    #[test]
    fn test_env_fills_missing_credentials() {
        let config = FeishuConfig::default()
            .with_fallback(lookup(&[("APP_ID", "cli_env"), ("APP_SECRET", "s3")]));
        assert_eq!(config.app_id, "cli_env");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_timeout_is_rejected_not_panicking() {
        let loaded: FeishuConfig =
            serde_json::from_str(r#"{"app_id": "cli_1", "app_secret": "s", "timeout_secs": 1e300}"#)
                .unwrap();
        assert_eq!(loaded.timeout_duration(), Duration::ZERO);
        assert_eq!(loaded.validate().unwrap_err().code(), FeishuError::CONFIG_ERROR);

        for secs in [f64::INFINITY, f64::NAN, -1.0, 0.0] {
            let config = FeishuConfig {
                timeout_secs: secs,
                ..FeishuConfig::new("cli_1", "s")
            };
            assert_eq!(config.timeout_duration(), Duration::ZERO);
            assert!(config.validate().is_err(), "timeout {secs} accepted");
        }

        let config = FeishuConfig::new("cli_1", "s").timeout(Duration::from_millis(1500));
        assert_eq!(config.timeout_duration(), Duration::from_millis(1500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_credentials() {
        let err = FeishuConfig::default().validate().unwrap_err();
        assert_eq!(err.code(), FeishuError::CONFIG_ERROR);
    }

    #[test]
    fn test_endpoint_trailing_slashes_stripped() {
        let config = FeishuConfig::new("a", "b").endpoint("https://open.feishu.cn/open-apis///");
        assert_eq!(config.normalized_endpoint(), "https://open.feishu.cn/open-apis");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = FeishuConfig::new("a", "very-secret").encrypt_key("k");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
