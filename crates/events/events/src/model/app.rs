//! Application lifecycle events.

use serde::{Deserialize, Serialize};

use super::Operator;

/// Whether the app is enabled for a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppStatus {
    StartByTenant,
    StopByTenant,
    StopByPlatform,
}

/// How an app store order was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuyType {
    Buy,
    Upgrade,
    Renew,
}

fn default_price_plan_type() -> String {
    "per_seat_per_month".to_string()
}

/// `app_open`: a tenant enabled the app for the first time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppOpenEvent {
    pub app_id: String,
    pub tenant_key: String,
    pub applicants: Vec<Operator>,
    /// Absent when the app was installed automatically.
    #[serde(default)]
    pub installer: Option<Operator>,
}

/// `app_status_change`: the app was enabled or disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppStatusChangeEvent {
    pub app_id: String,
    pub tenant_key: String,
    pub status: AppStatus,
}

/// `order_paid`: an app store plan was purchased.
///
/// Only the order identity is required; the billing details vary between
/// plan types and are defaulted when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaidEvent {
    pub app_id: String,
    pub tenant_key: String,
    pub order_id: String,
    #[serde(default)]
    pub price_plan_id: String,
    #[serde(default = "default_price_plan_type")]
    pub price_plan_type: String,
    #[serde(default)]
    pub seats: i64,
    #[serde(default)]
    pub buy_count: i64,
    #[serde(default)]
    pub create_time: String,
    #[serde(default)]
    pub pay_time: String,
    #[serde(default)]
    pub buy_type: Option<BuyType>,
    /// The superseded order when `buy_type` is `upgrade`.
    #[serde(default)]
    pub src_order_id: String,
    /// Amount paid, in cents.
    #[serde(default)]
    pub order_pay_price: i64,
}

/// `app_ticket`: pushed hourly to app store apps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppTicketEvent {
    pub app_id: String,
    pub app_ticket: String,
}

/// `app_uninstalled`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUninstalledEvent {
    pub app_id: String,
    pub tenant_key: String,
}
