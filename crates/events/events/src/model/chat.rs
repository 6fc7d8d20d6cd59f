//! Group chat events. Only delivered for chats the bot is a member of.

use serde::{Deserialize, Serialize};

use super::{Operator, User};

/// `add_user_to_chat`, `remove_user_from_chat` and
/// `revoke_add_user_from_chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserChatEvent {
    pub app_id: String,
    pub tenant_key: String,
    pub chat_id: String,
    /// The user themself when they left voluntarily.
    pub operator: Operator,
    pub users: Vec<User>,
}

/// `chat_disband`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatDisbandEvent {
    pub app_id: String,
    pub tenant_key: String,
    pub chat_id: String,
    pub operator: Operator,
}

/// The subset of group settings that changed. Unchanged settings are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSetting {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_open_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_member_permission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_notification: Option<bool>,
}

/// `group_setting_update`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSettingUpdateEvent {
    pub app_id: String,
    pub tenant_key: String,
    pub chat_id: String,
    #[serde(default)]
    pub after_change: GroupSetting,
    #[serde(default)]
    pub before_change: GroupSetting,
    #[serde(default)]
    pub operator: Option<Operator>,
}
