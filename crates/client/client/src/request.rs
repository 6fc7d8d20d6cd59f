//! Outbound request description.

use serde_json::Value;
use std::time::Duration;

/// Where a request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Path relative to the configured endpoint, e.g. `/bot/v3/info/`.
    Path(String),
    /// Absolute URL, used as is.
    Url(String),
}

/// A file part of a multipart body.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

/// Request body.
#[derive(Debug, Clone, Default)]
pub enum Body {
    #[default]
    Empty,
    /// Serialized as `application/json`.
    Json(Value),
    /// Sent as `multipart/form-data`.
    Multipart {
        fields: Vec<(String, String)>,
        files: Vec<FilePart>,
    },
}

/// A single call to the open platform.
///
/// ```rust,ignore
/// let request = ApiRequest::post("/bot/v4/add").json(json!({"chat_id": chat_id}));
/// let data = client.request(request).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: String,
    target: Target,
    query: Vec<(String, String)>,
    body: Body,
    auth: bool,
    timeout: Option<Duration>,
}

impl ApiRequest {
    /// Creates a request for a path relative to the endpoint.
    ///
    /// The method is checked when the request is sent; only `GET` and `POST`
    /// are accepted.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            target: Target::Path(path.into()),
            query: Vec::new(),
            body: Body::Empty,
            auth: true,
            timeout: None,
        }
    }

    /// Creates a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    /// Creates a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new("POST", path)
    }

    /// Sends the request to an absolute URL instead of a path.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.target = Target::Url(url.into());
        self
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Body::Json(body);
        self
    }

    /// Adds a text field to a multipart body.
    pub fn form_field(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let field = (name.into(), value.into());
        self.with_multipart(|fields, _| fields.push(field))
    }

    /// Adds a file to a multipart body.
    pub fn file(
        self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        mime: Option<&str>,
    ) -> Self {
        let part = FilePart {
            field: field.into(),
            file_name: file_name.into(),
            bytes,
            mime: mime.map(str::to_string),
        };
        self.with_multipart(|_, files| files.push(part))
    }

    /// Sends the request without an access token. Only the token endpoints
    /// need this.
    pub fn without_auth(mut self) -> Self {
        self.auth = false;
        self
    }

    /// Overrides the client's timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Returns true if an access token is attached.
    pub fn requires_auth(&self) -> bool {
        self.auth
    }

    pub fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }

    /// Resolves the full URL against the (already normalized) endpoint.
    pub fn resolve(&self, endpoint: &str) -> String {
        match &self.target {
            Target::Url(url) => url.clone(),
            Target::Path(path) if path.starts_with('/') => format!("{endpoint}{path}"),
            Target::Path(path) => format!("{endpoint}/{path}"),
        }
    }

    fn with_multipart(
        mut self,
        update: impl FnOnce(&mut Vec<(String, String)>, &mut Vec<FilePart>),
    ) -> Self {
        let (mut fields, mut files) = match std::mem::take(&mut self.body) {
            Body::Multipart { fields, files } => (fields, files),
            _ => (Vec::new(), Vec::new()),
        };
        update(&mut fields, &mut files);
        self.body = Body::Multipart { fields, files };
        self
    }
}
