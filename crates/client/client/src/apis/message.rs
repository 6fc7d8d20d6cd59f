use feishu_core::{FeishuError, FeishuResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::{Receiver, message_id};
use crate::client::Shared;
use crate::mode::ExecutionMode;
use crate::request::ApiRequest;

const MESSAGE_SEND: &str = "/message/v4/send/";
const IMAGE_PUT: &str = "/image/v4/put/";
const IMAGE_GET: &str = "/image/v4/get";

/// What an uploaded image is used for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    #[default]
    Message,
    Avatar,
}

impl ImageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Avatar => "avatar",
        }
    }
}

/// Recognises an image by its leading bytes, returning its extension and
/// mime type.
pub fn detect_image(bytes: &[u8]) -> Option<(&'static str, &'static str)> {
    const SIGNATURES: &[(&[u8], &str, &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "png", "image/png"),
        (b"\xff\xd8\xff", "jpg", "image/jpeg"),
        (b"GIF87a", "gif", "image/gif"),
        (b"GIF89a", "gif", "image/gif"),
        (b"BM", "bmp", "image/bmp"),
        (b"II*\x00", "tiff", "image/tiff"),
        (b"MM\x00*", "tiff", "image/tiff"),
        (b"\x00\x00\x01\x00", "ico", "image/x-icon"),
    ];

    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some(("webp", "image/webp"));
    }
    SIGNATURES
        .iter()
        .find(|(magic, _, _)| bytes.starts_with(magic))
        .map(|&(_, ext, mime)| (ext, mime))
}

fn check_image(bytes: &[u8]) -> FeishuResult<(&'static str, &'static str)> {
    if bytes.is_empty() {
        return Err(FeishuError::InvalidImageOrContent {
            reason: "image is empty".to_string(),
        });
    }
    detect_image(bytes).ok_or_else(|| FeishuError::InvalidImageOrContent {
        reason: format!(
            "unrecognised image format (starts with {:02x?})",
            &bytes[..bytes.len().min(8)]
        ),
    })
}

/// Builds a `/message/v4/send/` body.
fn send_body(receiver: &Receiver, msg_type: &str, content: Value) -> Value {
    let mut body = Map::new();
    receiver.write_to(&mut body);
    body.insert("msg_type".to_string(), Value::String(msg_type.to_string()));
    body.insert("content".to_string(), content);
    Value::Object(body)
}

/// Message sending and image storage.
#[derive(Clone)]
pub struct MessageApi<M> {
    shared: Shared<M>,
}

impl<M: ExecutionMode> MessageApi<M> {
    pub(crate) fn new(shared: Shared<M>) -> Self {
        Self { shared }
    }

    /// Sends a prepared message body and returns the message id.
    pub fn send(&self, message: Value) -> M::Output<Option<String>> {
        self.shared.call(move |core| async move {
            let data = core
                .request(ApiRequest::post(MESSAGE_SEND).json(message))
                .await?;
            Ok(message_id(&data))
        })
    }

    /// Sends a text message and returns the message id.
    ///
    /// Blank text is not sent; the call then returns `None`.
    pub fn send_text(&self, receiver: Receiver, text: impl Into<String>) -> M::Output<Option<String>> {
        let text = text.into();
        self.shared.call(move |core| async move {
            if text.trim().is_empty() {
                tracing::warn!(receiver = receiver.id(), "Blank text message not sent");
                return Ok(None);
            }
            let body = send_body(&receiver, "text", json!({ "text": text }));
            let data = core
                .request(ApiRequest::post(MESSAGE_SEND).json(body))
                .await?;
            Ok(message_id(&data))
        })
    }

    /// Sends a previously uploaded image and returns the message id.
    pub fn send_image(&self, receiver: Receiver, image_key: impl Into<String>) -> M::Output<Option<String>> {
        let image_key = image_key.into();
        self.shared.call(move |core| async move {
            let body = send_body(&receiver, "image", json!({ "image_key": image_key }));
            let data = core
                .request(ApiRequest::post(MESSAGE_SEND).json(body))
                .await?;
            Ok(message_id(&data))
        })
    }

    /// Uploads an image for use in messages and returns its image key.
    ///
    /// Fails with [`FeishuError::InvalidImageOrContent`] without contacting
    /// the platform when the bytes are empty or not a known image format.
    pub fn upload_image(&self, image: Vec<u8>, image_type: ImageType) -> M::Output<String> {
        self.shared.call(move |core| async move {
            let (ext, mime) = check_image(&image)?;
            let request = ApiRequest::post(IMAGE_PUT)
                .form_field("image_type", image_type.as_str())
                .file("image", format!("image.{ext}"), image, Some(mime));
            let data = core.request(request).await?;

            data.get("image_key")
                .and_then(Value::as_str)
                .filter(|key| !key.is_empty())
                .map(str::to_string)
                .ok_or_else(|| FeishuError::InvalidImageOrContent {
                    reason: format!("upload returned no image_key: {data}"),
                })
        })
    }

    /// Downloads the raw bytes of an image.
    pub fn get_image(&self, image_key: impl Into<String>) -> M::Output<Vec<u8>> {
        let image_key = image_key.into();
        self.shared.call(move |core| async move {
            core.fetch(ApiRequest::get(IMAGE_GET).query("image_key", image_key))
                .await
        })
    }
}
