use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a work order. A missing status field on disk
/// deserializes as `New`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    New,
    InProgress,
    Completed,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::New => "new",
            OrderStatus::InProgress => "in-progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        };
        write!(f, "{label}")
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    /// Display number, e.g. "Z/2026/8/3"
    pub order_number: String,
    /// Reference to a client; not enforced, dangling ids are tolerated
    pub client_id: String,
    /// Cached name of the referenced client at association time.
    /// Kept in sync by the store when the client is renamed.
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub client_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub amount: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    pub client_id: Option<String>,
    pub description: Option<String>,
    pub status: Option<OrderStatus>,
    pub photos: Option<Vec<String>>,
    pub location: Option<String>,
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
}
