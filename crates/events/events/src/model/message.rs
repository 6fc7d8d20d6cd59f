//! Inbound message events, one struct per `msg_type`.

use serde::{Deserialize, Serialize};

/// Where a message was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatType {
    Private,
    Group,
}

/// Content kind of a message. Rich text arrives as `post`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MsgType {
    #[default]
    Text,
    Post,
    Image,
    File,
    MergeForward,
}

impl MsgType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Post => "post",
            Self::Image => "image",
            Self::File => "file",
            Self::MergeForward => "merge_forward",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Self::Text),
            "post" => Some(Self::Post),
            "image" => Some(Self::Image),
            "file" => Some(Self::File),
            "merge_forward" => Some(Self::MergeForward),
            _ => None,
        }
    }
}

/// Fields shared by every message event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMeta {
    pub app_id: String,
    pub tenant_key: String,
    #[serde(default)]
    pub root_id: String,
    #[serde(default)]
    pub parent_id: String,
    pub open_chat_id: String,
    pub chat_type: ChatType,
    pub msg_type: MsgType,
    pub open_id: String,
    pub open_message_id: String,
    pub is_mention: bool,
}

/// `message` with `msg_type = text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessageEvent {
    #[serde(flatten)]
    pub meta: MessageMeta,
    /// Raw text, including `<at>` tags for mentions.
    pub text: String,
    /// Text with the mention of this bot removed.
    pub text_without_at_bot: String,
}

/// `message` with `msg_type = post`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMessageEvent {
    #[serde(flatten)]
    pub meta: MessageMeta,
    pub text: String,
    #[serde(default)]
    pub text_without_at_bot: String,
    pub title: String,
    #[serde(default)]
    pub image_keys: Vec<String>,
}

/// `message` with `msg_type = image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMessageEvent {
    #[serde(flatten)]
    pub meta: MessageMeta,
    pub image_height: String,
    pub image_width: String,
    pub image_key: String,
}

/// `message` with `msg_type = file`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMessageEvent {
    #[serde(flatten)]
    pub meta: MessageMeta,
    pub file_key: String,
}

/// One entry of a merge-forwarded bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardedMessage {
    pub root_id: String,
    pub parent_id: String,
    pub open_chat_id: String,
    pub msg_type: MsgType,
    pub open_id: String,
    pub open_message_id: String,
    pub is_mention: bool,
    pub text: String,
    pub user_open_id: String,
    pub image_key: String,
    pub image_url: String,
    pub file_key: String,
    pub title: String,
    pub create_time: i64,
}

/// `message` with `msg_type = merge_forward`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeForwardMessageEvent {
    #[serde(flatten)]
    pub meta: MessageMeta,
    #[serde(default)]
    pub chat_id: String,
    #[serde(default)]
    pub user: String,
    pub msg_list: Vec<ForwardedMessage>,
}
