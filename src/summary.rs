//! Dashboard, revenue and customer screens.
//!
//! The backend computes the aggregates; this module only loads them with
//! screen-appropriate fallbacks and derives chart scaling and percentages.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::api::ConsoleApi;
use crate::error::Result;
use crate::models::{CustomerRow, CustomersSummary, DashboardSummary, RevenueSummary};
use crate::normalize::date::{parse_date_str, parse_timestamp};
use crate::normalize::value::{non_negative, number_at, text_at};
use crate::utils::format_thousands;

/// Default bar chart height, in pixels.
pub const CHART_HEIGHT: f64 = 200.0;

/// The dashboard never shows an error; a failed load shows zeros.
pub async fn load_dashboard(api: &ConsoleApi, day: Option<&str>) -> DashboardSummary {
    match api.dashboard_summary(day).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("dashboard summary unavailable: {}", e);
            DashboardSummary::default()
        }
    }
}

/// A row of the dashboard's recent orders table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentOrderRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub customer_name: String,
    pub phone: String,
    pub event_date: String,
    pub event_time: String,
    pub guest_count: u32,
    pub grand_total: f64,
    /// Raw backend token, shown as-is.
    pub status: String,
}

pub fn recent_order_rows(summary: &DashboardSummary) -> Vec<RecentOrderRow> {
    recent_order_rows_at(summary, Utc::now())
}

pub fn recent_order_rows_at(summary: &DashboardSummary, now: DateTime<Utc>) -> Vec<RecentOrderRow> {
    summary
        .recent_orders
        .iter()
        .enumerate()
        .map(|(idx, o)| recent_order_row(o, idx, now))
        .collect()
}

fn recent_order_row(o: &Value, idx: usize, now: DateTime<Utc>) -> RecentOrderRow {
    RecentOrderRow {
        id: text_at(o, &["/order_id"]).unwrap_or_else(|| format!("TEMP-{}", idx)),
        created_at: o
            .get("created_at")
            .and_then(parse_timestamp)
            .unwrap_or(now),
        customer_name: text_at(o, &["/customer_name"]).unwrap_or_else(|| "Unknown".to_string()),
        phone: text_at(o, &["/phone"]).unwrap_or_else(|| "-".to_string()),
        event_date: text_at(o, &["/event_date"]).unwrap_or_else(|| "-".to_string()),
        event_time: text_at(o, &["/event_time"]).unwrap_or_default(),
        guest_count: number_at(o, &["/guest_count"])
            .map(|n| non_negative(n).floor() as u32)
            .unwrap_or(0),
        grand_total: non_negative(number_at(o, &["/grand_total_usd"]).unwrap_or(0.0)),
        status: text_at(o, &["/status"]).unwrap_or_else(|| "confirmed".to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub date: String,
    pub revenue: f64,
    /// Axis label, e.g. `1.3k`.
    pub label: String,
    pub height: f64,
    pub is_highest: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelShare {
    pub label: &'static str,
    pub revenue: f64,
    pub percentage: f64,
}

impl RevenueSummary {
    /// Chart scale: the largest daily revenue, never below 1.
    pub fn max_revenue(&self) -> f64 {
        self.revenue_over_time
            .iter()
            .map(|p| p.revenue)
            .fold(1.0, f64::max)
    }

    pub fn chart_bars(&self, chart_height: f64) -> Vec<ChartBar> {
        let max = self.max_revenue();
        self.revenue_over_time
            .iter()
            .map(|p| ChartBar {
                date: p.date.clone(),
                revenue: p.revenue,
                label: format_thousands(p.revenue),
                height: p.revenue / max * chart_height,
                is_highest: p.revenue == max,
            })
            .collect()
    }

    /// Delivery vs pickup as a share of total revenue.
    pub fn channel_shares(&self) -> [ChannelShare; 2] {
        let share = |revenue: f64| {
            if self.total_revenue > 0.0 {
                revenue / self.total_revenue * 100.0
            } else {
                0.0
            }
        };
        let split = &self.revenue_by_delivery_type;
        [
            ChannelShare {
                label: "Delivery",
                revenue: split.delivery,
                percentage: share(split.delivery),
            },
            ChannelShare {
                label: "Pickup",
                revenue: split.pickup,
                percentage: share(split.pickup),
            },
        ]
    }

    /// `Jan 1, 2024 - Jan 8, 2024`, or empty when the range is missing.
    pub fn date_label(&self) -> String {
        let Some(range) = &self.date_range else {
            return String::new();
        };
        let fmt = |s: &str| {
            parse_date_str(s)
                .map(|d| d.format("%b %-d, %Y").to_string())
                .unwrap_or_else(|| s.to_string())
        };
        format!("{} - {}", fmt(&range.start), fmt(&range.end))
    }
}

impl CustomerRow {
    pub fn avg_order_value(&self) -> f64 {
        if self.order_count == 0 {
            0.0
        } else {
            self.total_spend / self.order_count as f64
        }
    }
}

impl CustomersSummary {
    /// Biggest spenders first.
    pub fn sorted_customers(&self) -> Vec<CustomerRow> {
        let mut rows = self.customers.clone();
        rows.sort_by(|a, b| b.total_spend.total_cmp(&a.total_spend));
        rows
    }

    pub fn top_customer_first_name(&self) -> String {
        self.top_customer
            .as_ref()
            .and_then(|c| c.name.split_whitespace().next())
            .map(String::from)
            .unwrap_or_else(|| "-".to_string())
    }
}

pub async fn load_revenue(api: &ConsoleApi, days: u32) -> Result<RevenueSummary> {
    api.revenue_summary(days).await
}

pub async fn load_customers(api: &ConsoleApi) -> Result<CustomersSummary> {
    api.customers_summary().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateRange, DeliverySplit, RevenuePoint};
    use chrono::TimeZone;
    use serde_json::json;

    fn revenue(points: &[f64], total: f64) -> RevenueSummary {
        RevenueSummary {
            total_revenue: total,
            revenue_over_time: points
                .iter()
                .enumerate()
                .map(|(i, r)| RevenuePoint {
                    date: format!("2024-01-0{}", i + 1),
                    revenue: *r,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_chart_scale_is_at_least_one() {
        assert_eq!(revenue(&[], 0.0).max_revenue(), 1.0);
        assert_eq!(revenue(&[0.0, 0.5], 0.5).max_revenue(), 1.0);
        assert_eq!(revenue(&[120.0, 480.0, 240.0], 840.0).max_revenue(), 480.0);
    }

    #[test]
    fn test_chart_bars_scale_to_height() {
        let bars = revenue(&[120.0, 480.0, 240.0], 840.0).chart_bars(CHART_HEIGHT);
        assert_eq!(bars[0].height, 50.0);
        assert_eq!(bars[1].height, 200.0);
        assert!(bars[1].is_highest);
        assert!(!bars[2].is_highest);
    }

    #[test]
    fn test_channel_shares() {
        let mut r = revenue(&[], 400.0);
        r.revenue_by_delivery_type = DeliverySplit {
            delivery: 300.0,
            pickup: 100.0,
        };
        let [delivery, pickup] = r.channel_shares();
        assert_eq!(delivery.percentage, 75.0);
        assert_eq!(pickup.percentage, 25.0);

        r.total_revenue = 0.0;
        assert_eq!(r.channel_shares()[0].percentage, 0.0);
    }

    #[test]
    fn test_date_label() {
        let mut r = revenue(&[], 0.0);
        assert_eq!(r.date_label(), "");
        r.date_range = Some(DateRange {
            start: "2024-01-01".to_string(),
            end: "2024-01-08T23:59:59Z".to_string(),
        });
        assert_eq!(r.date_label(), "Jan 1, 2024 - Jan 8, 2024");
    }

    #[test]
    fn test_customers_sorted_by_spend() {
        let row = |name: &str, spend: f64, count: u64| CustomerRow {
            id: name.to_lowercase(),
            name: name.to_string(),
            phone: "-".to_string(),
            order_count: count,
            total_spend: spend,
        };
        let summary = CustomersSummary {
            customers: vec![row("Low", 10.0, 1), row("High", 900.0, 3), row("Mid", 300.0, 0)],
            top_customer: Some(row("Divya Iyer", 900.0, 3)),
            ..Default::default()
        };
        let names: Vec<String> = summary.sorted_customers().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["High", "Mid", "Low"]);
        assert_eq!(summary.top_customer_first_name(), "Divya");
        assert_eq!(summary.customers[1].avg_order_value(), 300.0);
        assert_eq!(summary.customers[2].avg_order_value(), 0.0);
        assert_eq!(CustomersSummary::default().top_customer_first_name(), "-");
    }

    #[test]
    fn test_recent_order_rows_defaults() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let summary = DashboardSummary {
            recent_orders: vec![
                json!({ "order_id": "R1", "customer_name": "Kiran", "grand_total_usd": "88.5",
                        "created_at": 1_735_689_600, "status": "preparing", "guest_count": 25 }),
                json!({}),
            ],
            ..Default::default()
        };
        let rows = recent_order_rows_at(&summary, now);
        assert_eq!(rows[0].id, "R1");
        assert_eq!(rows[0].grand_total, 88.5);
        assert_eq!(rows[0].guest_count, 25);
        assert_eq!(rows[0].status, "preparing");
        assert_eq!(rows[1].id, "TEMP-1");
        assert_eq!(rows[1].customer_name, "Unknown");
        assert_eq!(rows[1].event_date, "-");
        assert_eq!(rows[1].status, "confirmed");
        assert_eq!(rows[1].created_at, now);
    }

    #[tokio::test]
    async fn test_dashboard_falls_back_to_zeros_when_unreachable() {
        let api = ConsoleApi::with_timeout("http://127.0.0.1:1", 2);
        let d = load_dashboard(&api, Some("2024-05-01")).await;
        assert_eq!(d.day, None);
        assert_eq!(d.total_orders_today, 0);
        assert_eq!(d.total_revenue_today, 0.0);
        assert_eq!(d.upcoming_events, 0);
        assert_eq!(d.pending_orders, 0);
        assert!(d.recent_orders.is_empty());
        assert!(recent_order_rows(&d).is_empty());
    }
}
