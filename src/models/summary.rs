use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if v.is_finite() { v } else { 0.0 })
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = lenient_f64(deserializer)?;
    Ok(if v > 0.0 { v.trunc() as u64 } else { 0 })
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_u64(deserializer)?.min(u32::MAX as u64) as u32)
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Non-arrays become empty; malformed elements are skipped.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Any value that does not decode as `T` becomes `T::default()`.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Decode a whole summary body; a body of the wrong shape yields the default.
pub fn summary_from_value<T: DeserializeOwned + Default>(body: Value) -> T {
    match serde_json::from_value(body) {
        Ok(summary) => summary,
        Err(e) => {
            tracing::warn!("unexpected summary payload: {}", e);
            T::default()
        }
    }
}

/// `GET /dashboard/summary`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSummary {
    #[serde(deserialize_with = "lenient")]
    pub day: Option<String>,
    #[serde(deserialize_with = "lenient_u64")]
    pub total_orders_today: u64,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_revenue_today: f64,
    #[serde(deserialize_with = "lenient_u64")]
    pub upcoming_events: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub pending_orders: u64,
    /// Raw records; rendered through `summary::recent_order_rows`.
    #[serde(deserialize_with = "lenient_vec")]
    pub recent_orders: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevenuePoint {
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopItem {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub revenue: f64,
    #[serde(deserialize_with = "lenient_u64")]
    pub orders: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliverySplit {
    #[serde(deserialize_with = "lenient_f64")]
    pub delivery: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub pickup: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    #[serde(deserialize_with = "lenient_string")]
    pub start: String,
    #[serde(deserialize_with = "lenient_string")]
    pub end: String,
}

/// `GET /revenue/summary?days=N`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevenueSummary {
    #[serde(deserialize_with = "lenient_u32")]
    pub days: u32,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_revenue: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub avg_order_value: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub highest_order: f64,
    #[serde(deserialize_with = "lenient_vec")]
    pub revenue_over_time: Vec<RevenuePoint>,
    #[serde(deserialize_with = "lenient")]
    pub revenue_by_delivery_type: DeliverySplit,
    #[serde(deserialize_with = "lenient_vec")]
    pub top_items: Vec<TopItem>,
    #[serde(deserialize_with = "lenient")]
    pub date_range: Option<DateRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerRow {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_u64")]
    pub order_count: u64,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_spend: f64,
}

/// `GET /customers/summary`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomersSummary {
    #[serde(deserialize_with = "lenient_u64")]
    pub total_customers: u64,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_spend: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub avg_spend_per_customer: f64,
    #[serde(deserialize_with = "lenient")]
    pub top_customer: Option<CustomerRow>,
    #[serde(deserialize_with = "lenient_vec")]
    pub customers: Vec<CustomerRow>,
}
