//! Event registry mapping `type` discriminators to typed payloads.
//!
//! The table is built once on first use and never mutated afterwards.

use feishu_core::{FeishuError, FeishuResult};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::event::EventContent;
use crate::model::app::*;
use crate::model::approval::*;
use crate::model::bot::*;
use crate::model::calendar::*;
use crate::model::chat::*;
use crate::model::contact::*;
use crate::model::message::*;

/// Parses a raw payload whose discriminator is already known.
///
/// `Ok(None)` means the payload should be treated as unknown.
type Parser = fn(&Value) -> Result<Option<EventContent>, serde_json::Error>;

macro_rules! typed {
    ($model:ty => $variant:path) => {
        (|raw: &Value| <$model>::deserialize(raw).map($variant).map(Some)) as Parser
    };
}

static REGISTRY: LazyLock<HashMap<&'static str, Parser>> = LazyLock::new(|| {
    HashMap::from([
        ("app_open", typed!(AppOpenEvent => EventContent::AppOpen)),
        ("app_status_change", typed!(AppStatusChangeEvent => EventContent::AppStatusChange)),
        ("order_paid", typed!(OrderPaidEvent => EventContent::OrderPaid)),
        ("app_ticket", typed!(AppTicketEvent => EventContent::AppTicket)),
        ("app_uninstalled", typed!(AppUninstalledEvent => EventContent::AppUninstalled)),
        ("user_add", typed!(UserAddEvent => EventContent::UserAdd)),
        ("dept_add", typed!(DeptAddEvent => EventContent::DeptAdd)),
        ("user_status_change", typed!(UserStatusChangeEvent => EventContent::UserStatusChange)),
        ("contact_scope_change", typed!(ContactScopeChangeEvent => EventContent::ContactScopeChange)),
        ("add_bot", typed!(BotEvent => EventContent::AddBot)),
        ("remove_bot", typed!(BotEvent => EventContent::RemoveBot)),
        ("p2p_chat_create", typed!(P2pChatCreateEvent => EventContent::P2pChatCreate)),
        ("message", parse_message as Parser),
        ("message_read", typed!(MessageReadEvent => EventContent::MessageRead)),
        ("add_user_to_chat", typed!(UserChatEvent => EventContent::AddUserToChat)),
        ("remove_user_from_chat", typed!(UserChatEvent => EventContent::RemoveUserFromChat)),
        ("revoke_add_user_from_chat", typed!(UserChatEvent => EventContent::RevokeAddUserFromChat)),
        ("chat_disband", typed!(ChatDisbandEvent => EventContent::ChatDisband)),
        ("group_setting_update", typed!(GroupSettingUpdateEvent => EventContent::GroupSettingUpdate)),
        ("leave_approval", typed!(LeaveApprovalEvent => EventContent::LeaveApproval)),
        ("leave_approvalV2", typed!(LeaveApprovalV2Event => EventContent::LeaveApprovalV2)),
        ("work_approval", typed!(WorkApprovalEvent => EventContent::WorkApproval)),
        ("shift_approval", typed!(ShiftApprovalEvent => EventContent::ShiftApproval)),
        ("remedy_approval", typed!(RemedyApprovalEvent => EventContent::RemedyApproval)),
        ("trip_approval", typed!(TripApprovalEvent => EventContent::TripApproval)),
        ("out_approval", typed!(OutApprovalEvent => EventContent::OutApproval)),
        ("event_reply", typed!(EventReplyEvent => EventContent::EventReply)),
    ])
});

fn parse_message(raw: &Value) -> Result<Option<EventContent>, serde_json::Error> {
    let msg_type = raw
        .get("msg_type")
        .and_then(Value::as_str)
        .and_then(MsgType::parse);

    let content = match msg_type {
        Some(MsgType::Text) => EventContent::TextMessage(TextMessageEvent::deserialize(raw)?),
        Some(MsgType::Post) => EventContent::PostMessage(PostMessageEvent::deserialize(raw)?),
        Some(MsgType::Image) => EventContent::ImageMessage(ImageMessageEvent::deserialize(raw)?),
        Some(MsgType::File) => EventContent::FileMessage(FileMessageEvent::deserialize(raw)?),
        Some(MsgType::MergeForward) => {
            EventContent::MergeForwardMessage(MergeForwardMessageEvent::deserialize(raw)?)
        }
        None => return Ok(None),
    };
    Ok(Some(content))
}

/// Returns true if `event_type` has a typed model.
pub fn is_registered(event_type: &str) -> bool {
    REGISTRY.contains_key(event_type)
}

/// Returns every discriminator with a typed model.
pub fn registered_types() -> Vec<&'static str> {
    let mut types: Vec<_> = REGISTRY.keys().copied().collect();
    types.sort_unstable();
    types
}

/// Classifies a raw event payload by its `type` discriminator.
///
/// Payloads with an unrecognised discriminator (or a `message` with an
/// unrecognised `msg_type`) come back as [`EventContent::Unknown`]. A
/// recognised discriminator whose payload does not fit the model is a
/// [`FeishuError::Validation`] carrying the payload.
pub fn classify(raw: Value) -> FeishuResult<EventContent> {
    let Some(event_type) = raw.get("type").and_then(Value::as_str) else {
        return Ok(EventContent::Unknown(raw));
    };
    let Some(parse) = REGISTRY.get(event_type) else {
        tracing::debug!(event_type, "no typed model for event");
        return Ok(EventContent::Unknown(raw));
    };

    match parse(&raw) {
        Ok(Some(content)) => Ok(content),
        Ok(None) => Ok(EventContent::Unknown(raw)),
        Err(e) => Err(FeishuError::validation(format!("{event_type}: {e}"), raw)),
    }
}
