//! Event types and structures.

use chrono::{DateTime, Utc};
use feishu_core::FeishuResult;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::model::app::*;
use crate::model::approval::*;
use crate::model::bot::*;
use crate::model::calendar::*;
use crate::model::chat::*;
use crate::model::contact::*;
use crate::model::message::*;
use crate::registry;

/// The `type` of the outer envelope for subscribed events.
pub const EVENT_CALLBACK: &str = "event_callback";

/// The `type` of the handshake sent when a callback URL is configured.
pub const URL_VERIFICATION: &str = "url_verification";

/// A subscribed event as delivered to the event callback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Send time, roughly when the event happened (fractional unix seconds).
    pub ts: String,
    /// Unique id of this delivery.
    pub uuid: String,
    /// Verification token, comparable with the configured one.
    pub token: String,
    /// Always `event_callback`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// The classified payload.
    pub event: EventContent,
}

impl Event {
    /// Builds an event from a decoded `event_callback` envelope, classifying
    /// its inner payload.
    pub fn from_callback(payload: &Value) -> FeishuResult<Self> {
        let field = |name: &str| {
            payload
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let event = registry::classify(payload.get("event").cloned().unwrap_or(Value::Null))?;
        Ok(Self {
            ts: field("ts"),
            uuid: field("uuid"),
            token: field("token"),
            event_type: payload
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or(EVENT_CALLBACK)
                .to_string(),
            event,
        })
    }

    /// Parses `ts` into a timestamp.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let secs: f64 = self.ts.parse().ok()?;
        if !secs.is_finite() || secs < 0.0 {
            return None;
        }
        let whole = secs.trunc() as i64;
        let nanos = ((secs - secs.trunc()) * 1e9).round().min(999_999_999.0) as u32;
        DateTime::from_timestamp(whole, nanos)
    }
}

/// The inner payload of an event, one variant per discriminator.
///
/// `message` is split by `msg_type`, and the three user/chat membership
/// types share one payload. Anything unrecognised is kept verbatim in
/// [`EventContent::Unknown`].
#[derive(Debug, Clone, PartialEq)]
pub enum EventContent {
    AppOpen(AppOpenEvent),
    AppStatusChange(AppStatusChangeEvent),
    OrderPaid(OrderPaidEvent),
    AppTicket(AppTicketEvent),
    AppUninstalled(AppUninstalledEvent),

    UserAdd(UserAddEvent),
    DeptAdd(DeptAddEvent),
    UserStatusChange(UserStatusChangeEvent),
    ContactScopeChange(ContactScopeChangeEvent),

    AddBot(BotEvent),
    RemoveBot(BotEvent),
    P2pChatCreate(P2pChatCreateEvent),
    TextMessage(TextMessageEvent),
    PostMessage(PostMessageEvent),
    ImageMessage(ImageMessageEvent),
    FileMessage(FileMessageEvent),
    MergeForwardMessage(MergeForwardMessageEvent),
    MessageRead(MessageReadEvent),

    AddUserToChat(UserChatEvent),
    RemoveUserFromChat(UserChatEvent),
    RevokeAddUserFromChat(UserChatEvent),
    ChatDisband(ChatDisbandEvent),
    GroupSettingUpdate(GroupSettingUpdateEvent),

    LeaveApproval(LeaveApprovalEvent),
    LeaveApprovalV2(LeaveApprovalV2Event),
    WorkApproval(WorkApprovalEvent),
    ShiftApproval(ShiftApprovalEvent),
    RemedyApproval(RemedyApprovalEvent),
    TripApproval(TripApprovalEvent),
    OutApproval(OutApprovalEvent),

    EventReply(EventReplyEvent),

    /// A discriminator with no typed model, kept as received.
    Unknown(Value),
}

impl EventContent {
    /// Returns the `type` discriminator of this payload.
    pub fn event_type(&self) -> &str {
        match self {
            Self::AppOpen(_) => "app_open",
            Self::AppStatusChange(_) => "app_status_change",
            Self::OrderPaid(_) => "order_paid",
            Self::AppTicket(_) => "app_ticket",
            Self::AppUninstalled(_) => "app_uninstalled",
            Self::UserAdd(_) => "user_add",
            Self::DeptAdd(_) => "dept_add",
            Self::UserStatusChange(_) => "user_status_change",
            Self::ContactScopeChange(_) => "contact_scope_change",
            Self::AddBot(_) => "add_bot",
            Self::RemoveBot(_) => "remove_bot",
            Self::P2pChatCreate(_) => "p2p_chat_create",
            Self::TextMessage(_)
            | Self::PostMessage(_)
            | Self::ImageMessage(_)
            | Self::FileMessage(_)
            | Self::MergeForwardMessage(_) => "message",
            Self::MessageRead(_) => "message_read",
            Self::AddUserToChat(_) => "add_user_to_chat",
            Self::RemoveUserFromChat(_) => "remove_user_from_chat",
            Self::RevokeAddUserFromChat(_) => "revoke_add_user_from_chat",
            Self::ChatDisband(_) => "chat_disband",
            Self::GroupSettingUpdate(_) => "group_setting_update",
            Self::LeaveApproval(_) => "leave_approval",
            Self::LeaveApprovalV2(_) => "leave_approvalV2",
            Self::WorkApproval(_) => "work_approval",
            Self::ShiftApproval(_) => "shift_approval",
            Self::RemedyApproval(_) => "remedy_approval",
            Self::TripApproval(_) => "trip_approval",
            Self::OutApproval(_) => "out_approval",
            Self::EventReply(_) => "event_reply",
            Self::Unknown(raw) => raw.get("type").and_then(Value::as_str).unwrap_or(""),
        }
    }

    /// Returns true if the discriminator had no typed model.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }

    /// Returns the tenant the event belongs to, when the payload carries one.
    pub fn tenant_key(&self) -> Option<&str> {
        let tenant_key = match self {
            Self::AppOpen(e) => &e.tenant_key,
            Self::AppStatusChange(e) => &e.tenant_key,
            Self::OrderPaid(e) => &e.tenant_key,
            Self::AppTicket(_) => return None,
            Self::AppUninstalled(e) => &e.tenant_key,
            Self::UserAdd(e) => &e.tenant_key,
            Self::DeptAdd(e) => &e.tenant_key,
            Self::UserStatusChange(e) => &e.tenant_key,
            Self::ContactScopeChange(e) => &e.tenant_key,
            Self::AddBot(e) | Self::RemoveBot(e) => &e.tenant_key,
            Self::P2pChatCreate(e) => &e.tenant_key,
            Self::TextMessage(e) => &e.meta.tenant_key,
            Self::PostMessage(e) => &e.meta.tenant_key,
            Self::ImageMessage(e) => &e.meta.tenant_key,
            Self::FileMessage(e) => &e.meta.tenant_key,
            Self::MergeForwardMessage(e) => &e.meta.tenant_key,
            Self::MessageRead(e) => &e.tenant_key,
            Self::AddUserToChat(e) | Self::RemoveUserFromChat(e) | Self::RevokeAddUserFromChat(e) => {
                &e.tenant_key
            }
            Self::ChatDisband(e) => &e.tenant_key,
            Self::GroupSettingUpdate(e) => &e.tenant_key,
            Self::LeaveApproval(e) => &e.tenant_key,
            Self::LeaveApprovalV2(e) => &e.tenant_key,
            Self::WorkApproval(e) => &e.tenant_key,
            Self::ShiftApproval(e) => &e.tenant_key,
            Self::RemedyApproval(e) => &e.tenant_key,
            Self::TripApproval(e) => &e.tenant_key,
            Self::OutApproval(e) => &e.tenant_key,
            Self::EventReply(e) => &e.tenant_key,
            Self::Unknown(raw) => return raw.get("tenant_key").and_then(Value::as_str),
        };
        Some(tenant_key.as_str()).filter(|key| !key.is_empty())
    }

    /// Converts the payload back into the JSON shape it was received in.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        let mut value = match self {
            Self::Unknown(raw) => return Ok(raw.clone()),
            Self::AppOpen(e) => serde_json::to_value(e)?,
            Self::AppStatusChange(e) => serde_json::to_value(e)?,
            Self::OrderPaid(e) => serde_json::to_value(e)?,
            Self::AppTicket(e) => serde_json::to_value(e)?,
            Self::AppUninstalled(e) => serde_json::to_value(e)?,
            Self::UserAdd(e) => serde_json::to_value(e)?,
            Self::DeptAdd(e) => serde_json::to_value(e)?,
            Self::UserStatusChange(e) => serde_json::to_value(e)?,
            Self::ContactScopeChange(e) => serde_json::to_value(e)?,
            Self::AddBot(e) | Self::RemoveBot(e) => serde_json::to_value(e)?,
            Self::P2pChatCreate(e) => serde_json::to_value(e)?,
            Self::TextMessage(e) => serde_json::to_value(e)?,
            Self::PostMessage(e) => serde_json::to_value(e)?,
            Self::ImageMessage(e) => serde_json::to_value(e)?,
            Self::FileMessage(e) => serde_json::to_value(e)?,
            Self::MergeForwardMessage(e) => serde_json::to_value(e)?,
            Self::MessageRead(e) => serde_json::to_value(e)?,
            Self::AddUserToChat(e) | Self::RemoveUserFromChat(e) | Self::RevokeAddUserFromChat(e) => {
                serde_json::to_value(e)?
            }
            Self::ChatDisband(e) => serde_json::to_value(e)?,
            Self::GroupSettingUpdate(e) => serde_json::to_value(e)?,
            Self::LeaveApproval(e) => serde_json::to_value(e)?,
            Self::LeaveApprovalV2(e) => serde_json::to_value(e)?,
            Self::WorkApproval(e) => serde_json::to_value(e)?,
            Self::ShiftApproval(e) => serde_json::to_value(e)?,
            Self::RemedyApproval(e) => serde_json::to_value(e)?,
            Self::TripApproval(e) => serde_json::to_value(e)?,
            Self::OutApproval(e) => serde_json::to_value(e)?,
            Self::EventReply(e) => serde_json::to_value(e)?,
        };
        if let Value::Object(map) = &mut value {
            map.insert("type".to_string(), Value::from(self.event_type()));
        }
        Ok(value)
    }
}

impl Serialize for EventContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn callback(event: Value) -> Value {
        json!({
            "ts": "1589970805.376395",
            "uuid": "5226cd85b4d843dccee2e279d93f3ed3",
            "token": "GzhQEyfUcx7eEungQFWtXgCbxSpUOJIb",
            "type": "event_callback",
            "event": event
        })
    }

    #[test]
    fn test_from_callback() {
        let payload = callback(json!({
            "type": "app_ticket",
            "app_id": "cli_xxx",
            "app_ticket": "ticket"
        }));
        let event = Event::from_callback(&payload).unwrap();

        assert_eq!(event.uuid, "5226cd85b4d843dccee2e279d93f3ed3");
        assert_eq!(event.event_type, EVENT_CALLBACK);
        assert_eq!(event.event.event_type(), "app_ticket");
        assert!(event.event.tenant_key().is_none());
    }

    #[test]
    fn test_timestamp() {
        let event = Event::from_callback(&callback(json!({"type": "whatever"}))).unwrap();
        let ts = event.timestamp().unwrap();
        assert_eq!(ts.timestamp(), 1589970805);
        assert!(ts.timestamp_subsec_micros().abs_diff(376395) <= 1);
    }

    #[test]
    fn test_serialize_restores_discriminator() {
        let raw = json!({
            "type": "dept_add",
            "app_id": "cli_xxx",
            "tenant_key": "t1",
            "open_department_id": "od-xxx"
        });
        let content = registry::classify(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&content).unwrap(), raw);
    }

    #[test]
    fn test_unknown_keeps_raw_payload() {
        let raw = json!({"type": "vc_meeting_started", "tenant_key": "t9"});
        let content = registry::classify(raw.clone()).unwrap();
        assert_eq!(content.event_type(), "vc_meeting_started");
        assert_eq!(content.tenant_key(), Some("t9"));
        assert_eq!(serde_json::to_value(&content).unwrap(), raw);
    }
}
