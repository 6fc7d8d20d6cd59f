use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub open_id: String,
    #[serde(default)]
    pub employee_id: String,
    #[serde(default)]
    pub union_id: String,
}

/// `event_reply`: an attendee answered a calendar invitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventReplyEvent {
    pub app_id: String,
    pub tenant_key: String,
    pub event_id: String,
    pub attendee: Attendee,
    /// `accept`, `tentative` or `decline`.
    pub status: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, alias = "reply_timestmap")]
    pub reply_timestamp: String,
}
