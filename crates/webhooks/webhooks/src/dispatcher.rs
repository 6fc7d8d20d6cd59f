//! Event and card action dispatchers.
//!
//! A dispatcher takes one callback request, decrypts it if needed, answers
//! the URL verification handshake or hands the payload to the application
//! handler, and tells the adapter what to respond with.

use feishu_core::consts::headers;
use feishu_core::{FeishuError, FeishuResult};
use feishu_events::{CardAction, EVENT_CALLBACK, Event, URL_VERIFICATION};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;

use crate::config::WebhookConfig;
use crate::crypto;
use crate::handler::{ActionHandler, BlockingEventHandler, EventHandler};
use crate::receiver::{WebhookExtractor, WebhookResponse};
use crate::signature::{self, SignatureHeaders};

/// Parses a callback body, decrypting it when it is an `{"encrypt": ..}`
/// wrapper.
pub fn decode_payload(body: &[u8], encrypt_key: Option<&str>) -> FeishuResult<Value> {
    let payload: Value = serde_json::from_slice(body).map_err(|e| {
        FeishuError::validation(
            format!("callback body is not JSON: {e}"),
            Value::String(String::from_utf8_lossy(body).into_owned()),
        )
    })?;

    match payload.get("encrypt").and_then(Value::as_str) {
        Some(ciphertext) => crypto::decrypt(encrypt_key, ciphertext),
        None => Ok(payload),
    }
}

fn payload_str<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(Value::as_str)
}

/// Answers the handshake sent when a callback URL is saved in the console.
fn url_verification(config: &WebhookConfig, payload: &Value) -> WebhookResponse {
    if let Some(expected) = config.verify_token_str() {
        if payload_str(payload, "token") != Some(expected) {
            tracing::warn!("URL verification with a mismatched verify token");
            return WebhookResponse::challenge("");
        }
    }
    WebhookResponse::challenge(payload_str(payload, "challenge").unwrap_or_default())
}

/// Converts a processing result into what the adapter writes out.
fn respond(kind: &'static str, result: FeishuResult<WebhookResponse>) -> WebhookResponse {
    match result {
        Ok(response) => response,
        Err(FeishuError::InvalidSignature) => {
            tracing::warn!(kind, "Rejected callback with an invalid signature");
            WebhookResponse::unauthorized()
        }
        Err(e @ FeishuError::TaskFailed { .. }) => {
            tracing::error!(kind, error = %e, "Callback handler failed");
            WebhookResponse::empty()
        }
        Err(e) => {
            tracing::warn!(kind, code = e.code(), error = %e, "Rejected callback");
            WebhookResponse::empty()
        }
    }
}

enum Discipline {
    /// Synchronous handler on the blocking pool, bounded by a semaphore.
    Blocking {
        handler: Arc<dyn BlockingEventHandler>,
        permits: Arc<Semaphore>,
    },
    /// Async handler as a tokio task.
    Task { handler: Arc<dyn EventHandler> },
}

/// Dispatcher for the event subscription callback.
///
/// Events are handed off and acknowledged with `{}` straight away; the
/// handler runs in the background. Handler errors and panics are logged and
/// never reach the platform.
pub struct EventDispatcher {
    config: WebhookConfig,
    discipline: Discipline,
    tasks: Mutex<JoinSet<()>>,
}

impl EventDispatcher {
    /// Creates a dispatcher running a synchronous handler on tokio's
    /// blocking pool, at most `config.pool_size` at once.
    pub fn blocking(config: WebhookConfig, handler: impl BlockingEventHandler) -> Self {
        let permits = Arc::new(Semaphore::new(config.pool_size.max(1)));
        Self {
            config,
            discipline: Discipline::Blocking {
                handler: Arc::new(handler),
                permits,
            },
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Creates a dispatcher running an async handler as a tokio task per
    /// event.
    pub fn task(config: WebhookConfig, handler: impl EventHandler) -> Self {
        Self {
            config,
            discipline: Discipline::Task {
                handler: Arc::new(handler),
            },
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &WebhookConfig {
        &self.config
    }

    /// Processes one callback request.
    pub async fn process<E: WebhookExtractor + ?Sized>(
        &self,
        request: &E,
    ) -> FeishuResult<WebhookResponse> {
        // Event callbacks are signed with the encrypt key, when the platform
        // sends the headers at all.
        if let (Some(key), Some(headers)) = (
            self.config.encrypt_key_str(),
            SignatureHeaders::from_request(request),
        ) {
            headers.verify(key, request.body())?;
        }

        let payload = decode_payload(request.body(), self.config.encrypt_key_str())?;

        match payload_str(&payload, "type") {
            Some(URL_VERIFICATION) => Ok(url_verification(&self.config, &payload)),
            Some(EVENT_CALLBACK) => {
                if let Some(expected) = self.config.verify_token_str() {
                    if payload_str(&payload, "token") != Some(expected) {
                        tracing::warn!(
                            uuid = payload_str(&payload, "uuid").unwrap_or_default(),
                            "Dropped event with a mismatched verify token"
                        );
                        return Ok(WebhookResponse::empty());
                    }
                }

                let event = Event::from_callback(&payload)?;
                self.dispatch(event).await;
                Ok(WebhookResponse::empty())
            }
            other => {
                tracing::debug!(payload_type = other.unwrap_or_default(), "Ignored callback");
                Ok(WebhookResponse::empty())
            }
        }
    }

    /// Processes one callback request and never fails; see [`Self::process`].
    pub async fn handle<E: WebhookExtractor + ?Sized>(&self, request: &E) -> WebhookResponse {
        respond("event", self.process(request).await)
    }

    /// Hands an event to the handler without waiting for it.
    pub async fn dispatch(&self, event: Event) {
        let mut tasks = self.tasks.lock().await;
        // Reap finished tasks so the set does not grow without bound
        while tasks.try_join_next().is_some() {}

        match &self.discipline {
            Discipline::Blocking { handler, permits } => {
                let handler = Arc::clone(handler);
                let permits = Arc::clone(permits);
                tasks.spawn(async move {
                    let Ok(permit) = permits.acquire_owned().await else {
                        return;
                    };
                    let id = handler.id().to_string();
                    let uuid = event.uuid.clone();
                    let result = tokio::task::spawn_blocking(move || {
                        let _permit = permit;
                        handler.handle(event)
                    })
                    .await;
                    log_outcome(&id, &uuid, result);
                });
            }
            Discipline::Task { handler } => {
                let handler = Arc::clone(handler);
                tasks.spawn(async move {
                    let id = handler.id().to_string();
                    let uuid = event.uuid.clone();
                    let result = tokio::spawn(async move { handler.handle(event).await }).await;
                    log_outcome(&id, &uuid, result);
                });
            }
        }
    }

    /// Returns the number of handler runs that have not finished yet.
    pub async fn in_flight(&self) -> usize {
        let mut tasks = self.tasks.lock().await;
        while tasks.try_join_next().is_some() {}
        tasks.len()
    }

    /// Waits for every handler run dispatched so far.
    pub async fn drain(&self) {
        let mut tasks = std::mem::take(&mut *self.tasks.lock().await);
        while tasks.join_next().await.is_some() {}
    }
}

fn log_outcome(
    handler: &str,
    uuid: &str,
    result: Result<crate::handler::HandlerResult, tokio::task::JoinError>,
) {
    match result {
        Ok(Ok(())) => tracing::debug!(handler, uuid, "Event handled"),
        Ok(Err(e)) => tracing::error!(handler, uuid, error = %e, "Event handler error"),
        Err(e) if e.is_panic() => tracing::error!(handler, uuid, "Event handler panicked"),
        Err(e) => tracing::error!(handler, uuid, error = %e, "Event handler was cancelled"),
    }
}

/// Dispatcher for the card action callback.
///
/// Unlike events, the handler's reply is the response body, so the
/// dispatcher waits for it.
pub struct ActionDispatcher {
    config: WebhookConfig,
    handler: Arc<dyn ActionHandler>,
}

impl ActionDispatcher {
    /// Creates a new action dispatcher.
    pub fn new(config: WebhookConfig, handler: impl ActionHandler) -> Self {
        Self {
            config,
            handler: Arc::new(handler),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &WebhookConfig {
        &self.config
    }

    /// Processes one callback request.
    ///
    /// A failing or panicking handler is reported as
    /// [`FeishuError::TaskFailed`].
    pub async fn process<E: WebhookExtractor + ?Sized>(
        &self,
        request: &E,
    ) -> FeishuResult<WebhookResponse> {
        let payload = decode_payload(request.body(), self.config.encrypt_key_str())?;

        if payload_str(&payload, "type") == Some(URL_VERIFICATION) {
            return Ok(url_verification(&self.config, &payload));
        }

        // Card actions are signed with the verify token
        if let Some(token) = self.config.verify_token_str() {
            signature::verify_request(request, token)?;
        }

        let mut action = CardAction::from_value(&payload)?;
        action.refresh_token = request.header(headers::REFRESH_TOKEN).map(str::to_string);

        let handler = Arc::clone(&self.handler);
        let reply = tokio::spawn(async move { handler.handle(action).await }).await;
        let id = self.handler.id();
        match reply {
            Ok(Ok(Some(body))) => Ok(WebhookResponse::ok(body)),
            Ok(Ok(None)) => Ok(WebhookResponse::empty()),
            Ok(Err(e)) => Err(FeishuError::task(format!(
                "action handler '{id}' failed: {e}"
            ))),
            Err(e) if e.is_panic() => Err(FeishuError::task(format!(
                "action handler '{id}' panicked"
            ))),
            Err(e) => Err(FeishuError::task(format!(
                "action handler '{id}' was cancelled: {e}"
            ))),
        }
    }

    /// Processes one callback request and never fails; see [`Self::process`].
    pub async fn handle<E: WebhookExtractor + ?Sized>(&self, request: &E) -> WebhookResponse {
        respond("action", self.process(request).await)
    }
}
