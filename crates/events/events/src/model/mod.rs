//! Typed payloads for each callback event family.

pub mod app;
pub mod approval;
pub mod bot;
pub mod calendar;
pub mod card;
pub mod chat;
pub mod contact;
pub mod message;

use serde::{Deserialize, Serialize};

/// The user who performed an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub open_id: String,
    /// Only returned to self-built apps.
    #[serde(default)]
    pub user_id: String,
}

/// A user referenced by an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub open_id: String,
    #[serde(default)]
    pub user_id: String,
}
