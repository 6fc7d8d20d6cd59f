//! Typed wrappers over platform endpoints, one group per client field.

mod auth;
mod bot;
mod card;
mod message;

pub use auth::AuthApi;
pub use bot::{BotApi, BotInfo};
pub use card::CardApi;
pub use message::{ImageType, MessageApi, detect_image};

use serde_json::{Map, Value};

/// Who a message is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    Chat(String),
    OpenId(String),
    UserId(String),
    Email(String),
}

impl Receiver {
    pub fn chat(chat_id: impl Into<String>) -> Self {
        Self::Chat(chat_id.into())
    }

    pub fn open_id(open_id: impl Into<String>) -> Self {
        Self::OpenId(open_id.into())
    }

    pub fn user_id(user_id: impl Into<String>) -> Self {
        Self::UserId(user_id.into())
    }

    pub fn email(email: impl Into<String>) -> Self {
        Self::Email(email.into())
    }

    /// Body field naming the receiver.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Chat(_) => "chat_id",
            Self::OpenId(_) => "open_id",
            Self::UserId(_) => "user_id",
            Self::Email(_) => "email",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Chat(id) | Self::OpenId(id) | Self::UserId(id) | Self::Email(id) => id,
        }
    }

    pub(crate) fn write_to(&self, body: &mut Map<String, Value>) {
        body.insert(self.field().to_string(), Value::String(self.id().to_string()));
    }
}

/// Reads `message_id` out of a send response.
pub(crate) fn message_id(data: &Value) -> Option<String> {
    data.get("message_id")
        .and_then(Value::as_str)
        .map(str::to_string)
}
