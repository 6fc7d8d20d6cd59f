//! Handler traits invoked by the dispatchers.

use async_trait::async_trait;
use feishu_events::{CardAction, Event};
use serde_json::Value;
use std::future::Future;

/// Error type returned by application handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result of handling an event or action.
pub type HandlerResult<T = ()> = Result<T, HandlerError>;

/// Async handler for subscribed events, run as a tracked task.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    /// Returns a unique identifier for this handler.
    fn id(&self) -> &str {
        "anonymous"
    }

    /// Handles an event.
    async fn handle(&self, event: Event) -> HandlerResult;
}

/// Synchronous handler for subscribed events, run on the blocking pool.
pub trait BlockingEventHandler: Send + Sync + 'static {
    /// Returns a unique identifier for this handler.
    fn id(&self) -> &str {
        "anonymous"
    }

    /// Handles an event.
    fn handle(&self, event: Event) -> HandlerResult;
}

/// Handler for card actions.
///
/// The returned value, if any, becomes the response body and can carry an
/// updated card.
#[async_trait]
pub trait ActionHandler: Send + Sync + 'static {
    /// Returns a unique identifier for this handler.
    fn id(&self) -> &str {
        "anonymous"
    }

    /// Handles an action.
    async fn handle(&self, action: CardAction) -> HandlerResult<Option<Value>>;
}

/// Wrapper for function-based handlers.
pub struct FnHandler<F> {
    id: String,
    handler: F,
}

impl<F> FnHandler<F> {
    /// Creates a new function handler.
    pub fn new(id: impl Into<String>, handler: F) -> Self {
        Self {
            id: id.into(),
            handler,
        }
    }
}

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    async fn handle(&self, event: Event) -> HandlerResult {
        (self.handler)(event).await
    }
}

#[async_trait]
impl<F, Fut> ActionHandler for FnHandler<F>
where
    F: Fn(CardAction) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult<Option<Value>>> + Send + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    async fn handle(&self, action: CardAction) -> HandlerResult<Option<Value>> {
        (self.handler)(action).await
    }
}

/// Wrapper for synchronous function-based handlers.
pub struct BlockingFnHandler<F> {
    id: String,
    handler: F,
}

impl<F> BlockingFnHandler<F>
where
    F: Fn(Event) -> HandlerResult + Send + Sync + 'static,
{
    /// Creates a new synchronous function handler.
    pub fn new(id: impl Into<String>, handler: F) -> Self {
        Self {
            id: id.into(),
            handler,
        }
    }
}

impl<F> BlockingEventHandler for BlockingFnHandler<F>
where
    F: Fn(Event) -> HandlerResult + Send + Sync + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn handle(&self, event: Event) -> HandlerResult {
        (self.handler)(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_event() -> Event {
        Event::from_callback(&json!({
            "ts": "1", "uuid": "u", "token": "t", "type": "event_callback",
            "event": {"type": "custom"}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_fn_handler() {
        let handler = FnHandler::new("uuid-check", |event: Event| async move {
            let result: HandlerResult = if event.uuid == "u" {
                Ok(())
            } else {
                Err("unexpected uuid".into())
            };
            result
        });

        assert_eq!(EventHandler::id(&handler), "uuid-check");
        assert!(EventHandler::handle(&handler, sample_event()).await.is_ok());
    }

    #[test]
    fn test_blocking_fn_handler() {
        let handler = BlockingFnHandler::new("fails", |_event| Err("boom".into()));
        let err = handler.handle(sample_event()).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
