//! Background token renewal.

use feishu_core::effective_ttl;
use std::sync::Weak;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use crate::token::TokenManager;

/// Default wait before retrying a failed renewal.
pub const DEFAULT_RENEWAL_BACKOFF: Duration = Duration::from_secs(60);

/// Enables refreshing the access token shortly before it expires, so
/// request paths never wait on the token endpoint.
#[derive(Debug, Clone)]
pub struct RenewalPolicy {
    backoff: Duration,
}

impl Default for RenewalPolicy {
    fn default() -> Self {
        Self {
            backoff: DEFAULT_RENEWAL_BACKOFF,
        }
    }
}

impl RenewalPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the wait before retrying after a failed renewal.
    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn backoff_duration(&self) -> Duration {
        self.backoff
    }
}

/// Starts the renewal loop for a token that was just issued with `expire`.
///
/// The loop ends once the manager is dropped; closing the client aborts it.
pub(crate) fn spawn(
    handle: &Handle,
    policy: RenewalPolicy,
    manager: Weak<TokenManager>,
    expire: u64,
) -> AbortHandle {
    handle
        .spawn(async move {
            let mut wait = until_refresh(expire);
            loop {
                tokio::time::sleep(wait).await;
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                wait = match manager.refresh().await {
                    Ok(grant) => until_refresh(grant.expire),
                    Err(e) => {
                        tracing::warn!(
                            key = manager.key(),
                            error = %e,
                            retry_in_secs = policy.backoff.as_secs_f64(),
                            "Token renewal failed"
                        );
                        policy.backoff
                    }
                };
            }
            tracing::debug!("Token renewal stopped");
        })
        .abort_handle()
}

fn until_refresh(expire: u64) -> Duration {
    Duration::from_secs(effective_ttl(expire).max(1))
}
