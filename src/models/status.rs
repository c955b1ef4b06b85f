use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// UI-facing order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Map a backend token to its label. Case-insensitive; unknown tokens
    /// become `Confirmed`, and `completed` collapses into `Delivered`.
    pub fn from_backend_token(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "pending" => OrderStatus::Pending,
            "confirmed" => OrderStatus::Confirmed,
            "preparing" => OrderStatus::Preparing,
            "ready" => OrderStatus::Ready,
            "delivered" | "completed" => OrderStatus::Delivered,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Confirmed,
        }
    }

    /// Lower-cased label sent back to the backend.
    pub fn backend_token(&self) -> String {
        self.label().to_lowercase()
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Ready => "Ready",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Confirmed
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Strict parse of a UI label (case-insensitive). Unlike
/// [`OrderStatus::from_backend_token`] this rejects unknown input.
impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .iter()
            .copied()
            .find(|st| st.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown order status '{}'", s))
    }
}
