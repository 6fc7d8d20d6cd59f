//! Background token renewal under paused time.

use async_trait::async_trait;
use feishu_client::{RenewalPolicy, TokenGrant, TokenKind, TokenManager, TokenSource};
use feishu_core::{FeishuError, FeishuResult};
use feishu_store_memory::MemoryStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;

/// Issues `t-1`, `t-2`, ... and fails on the listed call numbers.
struct ScriptedSource {
    calls: AtomicUsize,
    failing: Vec<usize>,
}

impl ScriptedSource {
    fn new(failing: &[usize]) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            failing: failing.to_vec(),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenSource for ScriptedSource {
    async fn fetch(&self, _kind: TokenKind) -> FeishuResult<TokenGrant> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing.contains(&n) {
            return Err(FeishuError::timeout("token endpoint timed out"));
        }
        Ok(TokenGrant {
            token: format!("t-{n}"),
            expire: 7200,
        })
    }
}

fn renewing(source: Arc<ScriptedSource>) -> Arc<TokenManager> {
    TokenManager::with_renewal(
        TokenKind::Tenant,
        "cli_test",
        source,
        Arc::new(MemoryStore::new()),
        RenewalPolicy::new(),
        Handle::current(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_renews_before_expiry() {
    let source = ScriptedSource::new(&[]);
    let manager = renewing(source.clone());

    assert!(!manager.is_renewing());
    assert_eq!(manager.token().await.unwrap(), "t-1");
    assert!(manager.is_renewing());

    // Renewal fires 600 s before the declared 7200 s lifetime ends
    tokio::time::sleep(Duration::from_secs(6599)).await;
    assert_eq!(source.calls(), 1);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(source.calls(), 2);
    assert_eq!(manager.token().await.unwrap(), "t-2");

    tokio::time::sleep(Duration::from_secs(6600)).await;
    assert_eq!(source.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_failed_renewal_backs_off_and_retries() {
    let source = ScriptedSource::new(&[2]);
    let manager = renewing(source.clone());
    manager.token().await.unwrap();

    tokio::time::sleep(Duration::from_secs(6601)).await;
    assert_eq!(source.calls(), 2);

    // Retried 60 s after the failure at 6600 s
    tokio::time::sleep(Duration::from_secs(58)).await;
    assert_eq!(source.calls(), 2);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(source.calls(), 3);
    assert_eq!(manager.token().await.unwrap(), "t-3");
}

#[tokio::test(start_paused = true)]
async fn test_stop_renewal() {
    let source = ScriptedSource::new(&[]);
    let manager = renewing(source.clone());
    manager.token().await.unwrap();

    manager.stop_renewal();
    tokio::time::sleep(Duration::from_secs(20_000)).await;
    assert_eq!(source.calls(), 1);
    assert!(!manager.is_renewing());
}

#[tokio::test(start_paused = true)]
async fn test_renewal_ends_with_manager() {
    let source = ScriptedSource::new(&[]);
    let manager = renewing(source.clone());
    manager.token().await.unwrap();

    drop(manager);
    tokio::time::sleep(Duration::from_secs(20_000)).await;
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_no_renewal_without_policy() {
    let source = ScriptedSource::new(&[]);
    let manager = TokenManager::new(
        TokenKind::Tenant,
        "cli_test",
        source.clone(),
        Arc::new(MemoryStore::new()),
    );
    manager.token().await.unwrap();

    tokio::time::sleep(Duration::from_secs(20_000)).await;
    assert_eq!(source.calls(), 1);
    assert!(!manager.is_renewing());
}
