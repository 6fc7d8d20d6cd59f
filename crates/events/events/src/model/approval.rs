//! Attendance approval events.
//!
//! Times named `start_time`/`end_time` are unix seconds for the approval
//! itself; the `*_start_time`/`*_end_time` strings describe the request.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeUnit {
    Day,
    HalfDay,
    Hour,
}

/// Localised texts keyed by `@i18n@` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct I18nResource {
    pub locale: String,
    pub is_default: bool,
    pub texts: HashMap<String, String>,
}

/// `leave_approval`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveApprovalEvent {
    pub app_id: String,
    pub tenant_key: String,
    pub instance_code: String,
    pub employee_id: String,
    pub start_time: i64,
    pub end_time: i64,
    pub leave_type: String,
    /// 1 for whole days, 2 for half days.
    pub leave_unit: i64,
    pub leave_start_time: String,
    pub leave_end_time: String,
    /// Seconds.
    pub leave_interval: i64,
    pub leave_reason: String,
}

/// `leave_approvalV2`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveApprovalV2Event {
    pub app_id: String,
    pub tenant_key: String,
    pub instance_code: String,
    pub user_id: String,
    pub start_time: i64,
    pub end_time: i64,
    pub leave_name: String,
    pub leave_unit: TimeUnit,
    pub leave_start_time: String,
    pub leave_end_time: String,
    /// `[start, end]` pairs.
    pub leave_detail: Vec<Vec<String>>,
    pub leave_interval: i64,
    pub leave_reason: String,
    #[serde(default)]
    pub i18n_resources: Vec<I18nResource>,
}

/// `work_approval` (overtime)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkApprovalEvent {
    pub app_id: String,
    pub tenant_key: String,
    pub instance_code: String,
    pub employee_id: String,
    pub start_time: i64,
    pub end_time: i64,
    pub work_type: String,
    pub work_start_time: String,
    pub work_end_time: String,
    pub work_interval: i64,
    pub work_reason: String,
}

/// `shift_approval`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftApprovalEvent {
    pub app_id: String,
    pub tenant_key: String,
    #[serde(default)]
    pub instance_code: String,
    pub employee_id: String,
    pub start_time: i64,
    pub end_time: i64,
    pub shift_time: String,
    pub return_time: String,
    pub shift_reason: String,
}

/// `remedy_approval` (missed clock-in)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemedyApprovalEvent {
    pub app_id: String,
    pub tenant_key: String,
    #[serde(default)]
    pub instance_code: String,
    pub employee_id: String,
    pub start_time: i64,
    pub end_time: i64,
    pub remedy_time: String,
    pub remedy_reason: String,
}

/// One leg of a business trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub trip_start_time: String,
    pub trip_end_time: String,
    pub trip_interval: i64,
    pub departure: String,
    pub destination: String,
    pub transportation: String,
    pub trip_type: String,
    #[serde(default)]
    pub remark: String,
}

/// `trip_approval`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripApprovalEvent {
    pub app_id: String,
    pub tenant_key: String,
    pub instance_code: String,
    pub employee_id: String,
    pub start_time: i64,
    pub end_time: i64,
    pub schedules: Vec<Schedule>,
    pub trip_interval: i64,
    pub trip_reason: String,
    #[serde(default)]
    pub trip_peers: Vec<String>,
}

/// `out_approval`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutApprovalEvent {
    pub app_id: String,
    pub tenant_key: String,
    pub instance_code: String,
    pub user_id: String,
    pub start_time: i64,
    pub end_time: i64,
    pub out_name: String,
    pub out_unit: TimeUnit,
    pub out_start_time: String,
    pub out_end_time: String,
    pub out_interval: i64,
    pub out_reason: String,
    #[serde(default)]
    pub out_image: String,
    #[serde(default)]
    pub i18n_resources: Vec<I18nResource>,
}
