//! Contact directory events.

use serde::{Deserialize, Serialize};

/// `user_add`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAddEvent {
    pub app_id: String,
    pub tenant_key: String,
    pub open_id: String,
    #[serde(default)]
    pub employee_id: String,
    #[serde(default)]
    pub union_id: String,
}

/// `dept_add`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeptAddEvent {
    pub app_id: String,
    pub tenant_key: String,
    pub open_department_id: String,
}

/// Account flags reported by `user_status_change`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatus {
    pub is_active: bool,
    pub is_frozen: bool,
    pub is_resigned: bool,
}

/// `user_status_change`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatusChangeEvent {
    pub app_id: String,
    #[serde(default)]
    pub tenant_key: String,
    #[serde(default)]
    pub open_id: String,
    #[serde(default)]
    pub employee_id: String,
    #[serde(default)]
    pub union_id: String,
    #[serde(default)]
    pub before_status: UserStatus,
    #[serde(default)]
    pub current_status: UserStatus,
    #[serde(default)]
    pub change_time: String,
}

/// `contact_scope_change`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactScopeChangeEvent {
    pub app_id: String,
    pub tenant_key: String,
}
