//! HTTP transport shared by every call a client makes.

use feishu_core::{FeishuConfig, FeishuError, FeishuResult, unwrap_envelope};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::Instrument;

use crate::request::{ApiRequest, Body, FilePart};

/// Maps a reqwest failure to a connection error, flagging timeouts.
pub(crate) fn connection_error(err: reqwest::Error) -> FeishuError {
    if err.is_timeout() {
        FeishuError::timeout(err.to_string())
    } else {
        FeishuError::connection(err.to_string())
    }
}

/// Short id tying the request and response log lines together.
fn correlation_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Owns the lazily created `reqwest::Client` and the closed flag.
pub(crate) struct HttpTransport {
    endpoint: String,
    timeout: Duration,
    session: Mutex<Option<reqwest::Client>>,
    closed: AtomicBool,
}

impl HttpTransport {
    pub(crate) fn new(config: &FeishuConfig) -> Self {
        Self {
            endpoint: config.normalized_endpoint().to_string(),
            timeout: config.timeout_duration(),
            session: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Marks the transport closed. Returns false if it already was.
    pub(crate) fn mark_closed(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }

    /// Marks the transport closed and drops the HTTP session.
    pub(crate) async fn close(&self) {
        self.mark_closed();
        if self.session.lock().await.take().is_some() {
            tracing::debug!("HTTP session released");
        }
    }

    /// Sends a request and unwraps the platform envelope.
    pub(crate) async fn send(&self, request: &ApiRequest, token: Option<&str>) -> FeishuResult<Value> {
        let body = self.exchange(request, token).await?;
        unwrap_envelope(&body)
    }

    /// Sends a request and returns the raw response body.
    pub(crate) async fn fetch(&self, request: &ApiRequest, token: Option<&str>) -> FeishuResult<Vec<u8>> {
        self.exchange(request, token).await
    }

    async fn exchange(&self, request: &ApiRequest, token: Option<&str>) -> FeishuResult<Vec<u8>> {
        let url = request.resolve(&self.endpoint);
        let span = tracing::debug_span!(
            "feishu_request",
            request_id = %correlation_id(),
            method = request.method(),
            url = %url,
        );
        self.round_trip(request, token, &url).instrument(span).await
    }

    async fn round_trip(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
        url: &str,
    ) -> FeishuResult<Vec<u8>> {
        let method = match request.method() {
            "GET" => Method::GET,
            "POST" => Method::POST,
            other => {
                return Err(FeishuError::UnsupportedMethod {
                    method: other.to_string(),
                });
            }
        };

        let session = self.session().await?;
        let mut builder = session.request(method, url);
        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(timeout) = request.timeout_override() {
            builder = builder.timeout(timeout);
        }
        builder = match request.body() {
            Body::Empty => builder,
            Body::Json(body) => builder.json(body),
            Body::Multipart { fields, files } => builder.multipart(multipart_form(fields, files)?),
        };

        tracing::debug!(authenticated = token.is_some(), "Sending request");
        let response = builder.send().await.map_err(connection_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(connection_error)?;
        tracing::debug!(status, len = body.len(), "Received response");

        Ok(body.to_vec())
    }

    /// Returns the shared session, creating it on first use.
    async fn session(&self) -> FeishuResult<reqwest::Client> {
        let mut session = self.session.lock().await;
        if self.is_closed() {
            return Err(FeishuError::ClientClosed);
        }
        if let Some(client) = session.as_ref() {
            return Ok(client.clone());
        }

        let client = reqwest::Client::builder()
            .connect_timeout(self.timeout / 3)
            .read_timeout(self.timeout * 2 / 3)
            .timeout(self.timeout)
            .build()
            .map_err(|e| FeishuError::config(format!("failed to build HTTP client: {e}")))?;
        tracing::debug!(timeout_secs = self.timeout.as_secs_f64(), "HTTP session created");
        *session = Some(client.clone());
        Ok(client)
    }
}

fn multipart_form(fields: &[(String, String)], files: &[FilePart]) -> FeishuResult<Form> {
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name.clone(), value.clone());
    }
    for file in files {
        let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(mime) = &file.mime {
            part = part.mime_str(mime).map_err(|e| {
                FeishuError::validation(format!("invalid mime type: {e}"), Value::String(mime.clone()))
            })?;
        }
        form = form.part(file.field.clone(), part);
    }
    Ok(form)
}
