use feishu_core::FeishuError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::client::Shared;
use crate::mode::ExecutionMode;
use crate::request::ApiRequest;

const BOT_INFO: &str = "/bot/v3/info/";
const BOT_ADD: &str = "/bot/v4/add";
const BOT_REMOVE: &str = "/bot/v4/remove";

/// The app's bot as reported by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotInfo {
    /// 0 initialising, 1 deactivated, 2 activated, 3 install pending,
    /// 4 upgrade pending.
    pub activate_status: i64,
    pub app_name: String,
    pub avatar_url: String,
    pub ip_white_list: Vec<String>,
    pub open_id: String,
}

impl BotInfo {
    pub fn is_activated(&self) -> bool {
        self.activate_status == 2
    }
}

/// Bot management.
#[derive(Clone)]
pub struct BotApi<M> {
    shared: Shared<M>,
}

impl<M: ExecutionMode> BotApi<M> {
    pub(crate) fn new(shared: Shared<M>) -> Self {
        Self { shared }
    }

    /// Returns the bot's profile.
    pub fn info(&self) -> M::Output<BotInfo> {
        self.shared.call(|core| async move {
            let data = core.request(ApiRequest::get(BOT_INFO)).await?;
            match data.get("bot") {
                Some(bot) => serde_json::from_value(bot.clone()).map_err(|e| {
                    FeishuError::validation(format!("invalid bot info: {e}"), bot.clone())
                }),
                None => Ok(BotInfo::default()),
            }
        })
    }

    /// Adds the bot to a group chat.
    pub fn add_to_chat(&self, chat_id: impl Into<String>) -> M::Output<()> {
        self.membership(BOT_ADD, chat_id.into())
    }

    /// Removes the bot from a group chat.
    pub fn remove_from_chat(&self, chat_id: impl Into<String>) -> M::Output<()> {
        self.membership(BOT_REMOVE, chat_id.into())
    }

    fn membership(&self, path: &'static str, chat_id: String) -> M::Output<()> {
        self.shared.call(move |core| async move {
            let request = ApiRequest::post(path).json(json!({ "chat_id": chat_id }));
            let _: Value = core.request(request).await?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_info_tolerates_missing_fields() {
        let info: BotInfo = serde_json::from_value(json!({
            "activate_status": 2,
            "app_name": "helper",
            "open_id": "ou_bot"
        }))
        .unwrap();

        assert!(info.is_activated());
        assert_eq!(info.app_name, "helper");
        assert!(info.ip_white_list.is_empty());
    }
}
