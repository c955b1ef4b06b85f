use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::OrderStatus;

/// A single line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub name: String,
    /// Tray, Box, Add-on, ... (free-form, defaults to `Food`)
    #[serde(rename = "type")]
    pub kind: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
}

/// Canonical, UI-facing order. Built only by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    pub phone_number: String,
    pub guest_count: u32,
    pub delivery_type: String,
    pub address: Option<String>,
    pub status: OrderStatus,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    /// Set when the backend timestamp was missing or unparseable and
    /// `created_at` holds the ingestion time instead.
    pub created_at_inferred: bool,
    pub event_date: String,
    pub event_time: String,
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub tax: f64,
    pub grand_total: f64,
    pub special_instructions: Option<String>,
}

impl Order {
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Case-insensitive match on name or id, raw substring match on phone.
    pub fn matches_search(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let q = term.to_lowercase();
        self.customer_name.to_lowercase().contains(&q)
            || self.phone_number.contains(term)
            || self.id.to_lowercase().contains(&q)
    }
}
