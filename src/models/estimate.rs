use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One priced line of an estimate. `line_total` is written by the store
/// as `quantity * unit_price` at save time, never re-derived on read.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EstimateItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub line_total: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub id: String,
    /// Display number, e.g. "K/2026/8/1"
    pub estimate_number: String,
    pub client_id: String,
    /// Cached name of the referenced client, kept in sync on rename
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub items: Vec<EstimateItem>,
    /// Sum of line totals at last save
    #[serde(default)]
    pub total: f64,
    /// Optional so a damaged record on disk still loads; such records
    /// contribute nothing to revenue aggregations.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct EstimateItemDraft {
    pub description: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit_price: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct EstimateDraft {
    pub client_id: String,
    #[serde(default)]
    pub items: Vec<EstimateItemDraft>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct EstimatePatch {
    pub client_id: Option<String>,
    pub items: Option<Vec<EstimateItemDraft>>,
}
