//! Execution modes.
//!
//! Every public client call is one async body. The mode decides how that
//! body is driven: [`Blocking`] runs it to completion on a runtime the
//! client owns, [`NonBlocking`] spawns it on an existing runtime and hands
//! back a [`Pending`] future.

use feishu_core::{FeishuError, FeishuResult};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;

/// How a client drives its async request bodies.
pub trait ExecutionMode: Clone + Send + Sync + 'static {
    /// What a public call returns for a body producing `T`.
    type Output<T: Send + 'static>;

    /// Drives `body` according to this mode.
    fn run<T, F>(&self, body: F) -> Self::Output<T>
    where
        T: Send + 'static,
        F: Future<Output = FeishuResult<T>> + Send + 'static;

    /// Runtime that background work (token renewal) is spawned on.
    fn handle(&self) -> Handle;
}

/// Calls return their result directly.
///
/// Owns a small multi-thread runtime with a single worker. Calls must not be
/// made from inside an async context, and the last clone must not be dropped
/// there either.
#[derive(Clone)]
pub struct Blocking {
    runtime: Arc<Runtime>,
}

impl Blocking {
    /// Creates the mode and its runtime.
    pub fn new() -> FeishuResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("feishu-client")
            .enable_all()
            .build()
            .map_err(|e| FeishuError::config(format!("failed to start client runtime: {e}")))?;
        Ok(Self {
            runtime: Arc::new(runtime),
        })
    }
}

impl std::fmt::Debug for Blocking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blocking").finish_non_exhaustive()
    }
}

impl ExecutionMode for Blocking {
    type Output<T: Send + 'static> = FeishuResult<T>;

    fn run<T, F>(&self, body: F) -> Self::Output<T>
    where
        T: Send + 'static,
        F: Future<Output = FeishuResult<T>> + Send + 'static,
    {
        self.runtime.block_on(body)
    }

    fn handle(&self) -> Handle {
        self.runtime.handle().clone()
    }
}

/// Calls return a [`Pending`] future; the work runs on a tokio runtime.
#[derive(Debug, Clone)]
pub struct NonBlocking {
    handle: Handle,
}

impl NonBlocking {
    /// Uses the given runtime.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime the caller is running on.
    pub fn current() -> FeishuResult<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| FeishuError::config(format!("no tokio runtime available: {e}")))
    }
}

impl ExecutionMode for NonBlocking {
    type Output<T: Send + 'static> = Pending<T>;

    fn run<T, F>(&self, body: F) -> Self::Output<T>
    where
        T: Send + 'static,
        F: Future<Output = FeishuResult<T>> + Send + 'static,
    {
        Pending {
            task: self.handle.spawn(body),
        }
    }

    fn handle(&self) -> Handle {
        self.handle.clone()
    }
}

/// The eventual result of a call made through a [`NonBlocking`] client.
///
/// Dropping it detaches the call; it still runs to completion.
#[derive(Debug)]
#[must_use = "the result of the call is lost unless the future is awaited"]
pub struct Pending<T> {
    task: JoinHandle<FeishuResult<T>>,
}

impl<T> Pending<T> {
    /// Returns true once the call has finished.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<T> Future for Pending<T> {
    type Output = FeishuResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.task).poll(cx).map(|joined| match joined {
            Ok(result) => result,
            Err(e) if e.is_panic() => Err(FeishuError::task("client call panicked")),
            Err(e) => Err(FeishuError::task(format!("client call was cancelled: {e}"))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_returns_value() {
        let mode = Blocking::new().unwrap();
        let value = mode.run(async { Ok::<_, FeishuError>(7) }).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_non_blocking_requires_runtime() {
        let err = NonBlocking::current().unwrap_err();
        assert_eq!(err.code(), FeishuError::CONFIG_ERROR);
    }

    #[tokio::test]
    async fn test_pending_resolves() {
        let mode = NonBlocking::current().unwrap();
        let pending = mode.run(async { Ok::<_, FeishuError>("done") });
        assert_eq!(pending.await.unwrap(), "done");
    }

    #[tokio::test]
    async fn test_pending_reports_panic() {
        let mode = NonBlocking::current().unwrap();
        let pending = mode.run(async {
            if true {
                panic!("boom");
            }
            Ok::<(), FeishuError>(())
        });
        let err = pending.await.unwrap_err();
        assert!(matches!(err, FeishuError::TaskFailed { .. }));
    }
}
