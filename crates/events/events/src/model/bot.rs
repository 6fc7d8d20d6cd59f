//! Bot membership and conversation events.

use serde::{Deserialize, Serialize};

use super::{Operator, User};

/// Localised chat names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatI18nNames {
    #[serde(default)]
    pub en_us: String,
    #[serde(default)]
    pub zh_cn: String,
}

/// `add_bot` and `remove_bot`: the bot joined or left a group chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotEvent {
    pub app_id: String,
    pub tenant_key: String,
    #[serde(default, alias = "chat_i18_names")]
    pub chat_i18n_names: Option<ChatI18nNames>,
    pub chat_name: String,
    /// Missing when the owner is a bot.
    #[serde(default)]
    pub chat_owner_employee_id: String,
    #[serde(default)]
    pub chat_owner_name: String,
    pub chat_owner_open_id: String,
    pub open_chat_id: String,
    #[serde(default)]
    pub operator_employee_id: String,
    pub operator_name: String,
    pub operator_open_id: String,
    pub owner_is_bot: bool,
}

/// `p2p_chat_create`: a one-on-one chat with the bot was opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct P2pChatCreateEvent {
    pub app_id: String,
    pub tenant_key: String,
    pub chat_id: String,
    pub operator: Operator,
    pub user: User,
}

/// `message_read`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReadEvent {
    pub app_id: String,
    pub tenant_key: String,
    pub open_chat_id: String,
    pub open_id: String,
    pub open_message_ids: Vec<String>,
}
