//! Adapter for credential stores with a blocking API.

use async_trait::async_trait;
use feishu_core::{CredentialStore, FeishuError, FeishuResult, SyncCredentialStore};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Blocking store calls allowed in flight at once.
pub const BLOCKING_STORE_WORKERS: usize = 2;

/// Runs a [`SyncCredentialStore`] on tokio's blocking pool.
#[derive(Debug)]
pub struct BlockingStore<S> {
    inner: Arc<S>,
    permits: Arc<Semaphore>,
}

impl<S: SyncCredentialStore> BlockingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner: Arc::new(inner),
            permits: Arc::new(Semaphore::new(BLOCKING_STORE_WORKERS)),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn run<T, F>(&self, op: &'static str, call: F) -> FeishuResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> FeishuResult<T> + Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| FeishuError::store(format!("store pool closed: {e}")))?;
        let inner = Arc::clone(&self.inner);

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            call(&inner)
        })
        .await
        .map_err(|e| FeishuError::task(format!("blocking store {op} failed: {e}")))?
    }
}

#[async_trait]
impl<S: SyncCredentialStore> CredentialStore for BlockingStore<S> {
    async fn get(&self, key: &str) -> FeishuResult<Option<String>> {
        let key = key.to_string();
        self.run("get", move |store| store.get(&key)).await
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> FeishuResult<()> {
        let (key, value) = (key.to_string(), value.to_string());
        self.run("set", move |store| store.set(&key, &value, ttl_secs))
            .await
    }

    async fn remove(&self, key: &str) -> FeishuResult<()> {
        let key = key.to_string();
        self.run("remove", move |store| store.remove(&key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct SlowStore {
        entries: Mutex<HashMap<String, String>>,
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    impl SlowStore {
        fn enter(&self) {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            self.running.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl SyncCredentialStore for SlowStore {
        fn get(&self, key: &str) -> FeishuResult<Option<String>> {
            self.enter();
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str, _ttl_secs: u64) -> FeishuResult<()> {
            self.enter();
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> FeishuResult<()> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_round_trip() {
        let store = BlockingStore::new(SlowStore::default());
        store.set("k", "v", 7200).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_at_most_two_calls_in_flight() {
        let store = Arc::new(BlockingStore::new(SlowStore::default()));
        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            tasks.spawn(async move { store.get(&format!("k{i}")).await });
        }
        while let Some(result) = tasks.join_next().await {
            assert!(result.unwrap().unwrap().is_none());
        }

        assert!(store.inner().peak.load(Ordering::SeqCst) <= BLOCKING_STORE_WORKERS);
    }
}
