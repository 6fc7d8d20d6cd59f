//! Interactive card callbacks.
//!
//! Card actions are not wrapped in the `event_callback` envelope: they carry
//! no `ts`/`uuid`, and their `token` refreshes the card rather than
//! verifying the sender.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The element the user interacted with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// The `value` configured on the element.
    #[serde(default)]
    pub value: Option<Map<String, Value>>,
    pub tag: String,
    /// Selected option; empty for buttons.
    #[serde(default)]
    pub option: String,
}

/// A card interaction delivered to the action callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardAction {
    pub open_id: String,
    #[serde(default)]
    pub user_id: String,
    pub tenant_key: String,
    pub open_message_id: String,
    pub token: String,
    pub action: Action,
    /// Taken from the `X-Refresh-Token` header, not the body. It only
    /// changes once a click has been acknowledged, so non-idempotent
    /// handlers can use it to drop retries.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl CardAction {
    /// Parses an action body.
    pub fn from_value(raw: &Value) -> feishu_core::FeishuResult<Self> {
        Self::deserialize(raw).map_err(|e| {
            feishu_core::FeishuError::validation(format!("card action: {e}"), raw.clone())
        })
    }

    /// Returns a string entry of the action value.
    pub fn value_str(&self, key: &str) -> Option<&str> {
        self.action.value.as_ref()?.get(key)?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_button_action() {
        let raw = json!({
            "open_id": "ou_sdfimx9948345",
            "user_id": "eu_sd923r0sdf5",
            "open_message_id": "om_abcdefg1234567890",
            "tenant_key": "d32004232",
            "token": "NbgXzbtpcT",
            "action": {"value": {"key": "approve"}, "tag": "button"}
        });
        let action = CardAction::from_value(&raw).unwrap();

        assert_eq!(action.action.tag, "button");
        assert_eq!(action.action.option, "");
        assert_eq!(action.value_str("key"), Some("approve"));
        assert!(action.refresh_token.is_none());
    }

    #[test]
    fn test_missing_action_is_validation_error() {
        let raw = json!({"open_id": "ou_1", "tenant_key": "t"});
        let err = CardAction::from_value(&raw).unwrap_err();
        assert_eq!(err.code(), feishu_core::FeishuError::VALIDATION_ERROR);
    }
}
