//! Contract of the credential store traits as seen by adapter crates.

use async_trait::async_trait;
use feishu_core::{CredentialStore, FeishuConfig, FeishuError, FeishuResult, effective_ttl};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Records the ttl each key was stored with instead of expiring anything.
#[derive(Default)]
struct RecordingStore {
    entries: Mutex<HashMap<String, (String, u64)>>,
    fail: bool,
}

#[async_trait]
impl CredentialStore for RecordingStore {
    async fn get(&self, key: &str) -> FeishuResult<Option<String>> {
        if self.fail {
            return Err(FeishuError::store("backend down"));
        }
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .get(key)
            .filter(|(_, ttl)| *ttl > 0)
            .map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> FeishuResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), effective_ttl(ttl_secs)));
        Ok(())
    }

    async fn remove(&self, key: &str) -> FeishuResult<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

#[tokio::test]
async fn test_shared_store_through_arc() {
    let store = Arc::new(RecordingStore::default());
    let shared: Arc<dyn CredentialStore> = store.clone();

    shared.set("feishu:tenant:cli_1", "t-1", 7200).await.unwrap();
    assert_eq!(
        store.get("feishu:tenant:cli_1").await.unwrap().as_deref(),
        Some("t-1")
    );
    assert_eq!(store.entries.lock().unwrap()["feishu:tenant:cli_1"].1, 6600);

    store.remove("feishu:tenant:cli_1").await.unwrap();
    assert!(shared.get("feishu:tenant:cli_1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_short_lived_value_is_never_served() {
    let store = RecordingStore::default();
    store.set("k", "v", 600).await.unwrap();
    assert!(store.get("k").await.unwrap().is_none());
}

#[tokio::test]
async fn test_backend_failure_is_not_a_miss() {
    let store = RecordingStore {
        fail: true,
        ..Default::default()
    };
    let err = store.get("k").await.unwrap_err();
    assert_eq!(err.code(), FeishuError::STORE_ERROR);
}

#[test]
fn test_config_deserializes_with_defaults() {
    let config: FeishuConfig =
        serde_json::from_str(r#"{"app_id": "cli_1", "app_secret": "s"}"#).unwrap();
    assert_eq!(config.endpoint, feishu_core::consts::DEFAULT_ENDPOINT);
    assert_eq!(config.timeout_secs, feishu_core::consts::DEFAULT_TIMEOUT_SECS);
    assert!(config.validate().is_ok());
}
