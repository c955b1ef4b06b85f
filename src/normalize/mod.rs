//! Backend order records → canonical [`Order`]s.
//!
//! The backend's order schema is not under our control: the same field may
//! arrive under several keys (`order_id` / `id`, `customer_name` /
//! `customer.name`, ...), numbers may be strings, and anything may be
//! missing. Normalization never fails; every field has a documented default.
//!
//! | Field | Keys tried, in order | Default |
//! |-------|----------------------|---------|
//! | id | `order_id`, `id`, `orderId` | `TEMP-<index>` |
//! | customer name | `customer_name`, `customer.name`, `customerName` | `Unknown` |
//! | phone | `phone`, `customer.phone`, `phone_number`, `phoneNumber` | `-` |
//! | guests | `guest_count`, `event.guest_count`, `guestCount` | 0 |
//! | delivery type | `delivery_type`, `delivery.type`, `deliveryType` | `-` |
//! | subtotal | `subtotal_usd`, `subtotal`, `pricing.subtotal` | sum of item totals |
//! | delivery fee | `delivery_fee_usd`, `delivery_fee`, `pricing.delivery_fee` | 0 |
//! | tax | `tax_usd`, `tax`, `pricing.tax` | 0 |
//! | grand total | `grand_total_usd`, `grand_total`, `pricing.total` | subtotal + fee + tax |
//! | created at | `created_at`, `createdAt`, `created` | now |

pub mod date;
pub mod value;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::{Order, OrderItem, OrderStatus};
use date::{parse_timestamp, to_iso};
use value::{first_present, non_negative, number_at, text_at};

pub const UNKNOWN_CUSTOMER: &str = "Unknown";
pub const DEFAULT_CURRENCY: &str = "USD";

const ID_KEYS: &[&str] = &["/order_id", "/id", "/orderId"];
const ITEMS_KEYS: &[&str] = &["/items", "/ordered_items"];
const CUSTOMER_KEYS: &[&str] = &["/customer_name", "/customer/name", "/customerName"];
const PHONE_KEYS: &[&str] = &["/phone", "/customer/phone", "/phone_number", "/phoneNumber"];
const GUEST_KEYS: &[&str] = &["/guest_count", "/event/guest_count", "/guestCount"];
const DELIVERY_TYPE_KEYS: &[&str] = &["/delivery_type", "/delivery/type", "/deliveryType"];
const ADDRESS_KEYS: &[&str] = &["/address", "/delivery/address/line1", "/delivery/address"];
const NOTES_KEYS: &[&str] = &["/special_instructions", "/notes", "/specialInstructions"];
const CREATED_KEYS: &[&str] = &["/created_at", "/createdAt", "/created"];
const EVENT_DATE_KEYS: &[&str] = &["/event_date", "/event/date", "/eventDate"];
const EVENT_TIME_KEYS: &[&str] = &["/event_time", "/event/time", "/eventTime"];
const SUBTOTAL_KEYS: &[&str] = &["/subtotal_usd", "/subtotal", "/pricing/subtotal"];
const DELIVERY_FEE_KEYS: &[&str] = &["/delivery_fee_usd", "/delivery_fee", "/pricing/delivery_fee"];
const TAX_KEYS: &[&str] = &["/tax_usd", "/tax", "/pricing/tax"];
const GRAND_TOTAL_KEYS: &[&str] = &["/grand_total_usd", "/grand_total", "/pricing/total"];

const ITEM_ID_KEYS: &[&str] = &["/id", "/item_id"];
const ITEM_NAME_KEYS: &[&str] = &["/name", "/item_name"];
const ITEM_TYPE_KEYS: &[&str] = &["/type", "/category"];
const ITEM_QTY_KEYS: &[&str] = &["/quantity", "/qty"];
const ITEM_UNIT_KEYS: &[&str] = &["/unitPrice", "/unit_price", "/price"];
const ITEM_TOTAL_KEYS: &[&str] = &["/totalPrice", "/total_price", "/total"];

/// Normalize a fetched batch using the current time for missing timestamps.
pub fn normalize_orders(raw: &[Value]) -> Vec<Order> {
    Normalizer::new().orders(raw)
}

/// Clearly-empty records: no customer and nothing to charge.
pub fn is_placeholder(order: &Order) -> bool {
    order.customer_name == UNKNOWN_CUSTOMER && order.grand_total == 0.0
}

/// Order normalizer with a fixed notion of "now", so a whole batch
/// substitutes the same instant for missing timestamps.
#[derive(Debug, Clone)]
pub struct Normalizer {
    now: DateTime<Utc>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self { now: Utc::now() }
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Normalize a batch, preserving input order and dropping placeholders.
    pub fn orders(&self, raw: &[Value]) -> Vec<Order> {
        let orders: Vec<Order> = raw
            .iter()
            .enumerate()
            .map(|(index, v)| self.order(v, index))
            .filter(|o| !is_placeholder(o))
            .collect();
        if orders.len() < raw.len() {
            tracing::debug!(
                "dropped {} empty order record(s) of {}",
                raw.len() - orders.len(),
                raw.len()
            );
        }
        orders
    }

    /// Normalize a single record found at `index` in its batch.
    pub fn order(&self, v: &Value, index: usize) -> Order {
        let id = text_at(v, ID_KEYS).unwrap_or_else(|| {
            tracing::debug!("order at position {} has no id; using placeholder", index);
            format!("TEMP-{}", index)
        });

        let items = first_present(v, ITEMS_KEYS)
            .map(|raw| self.items(raw))
            .unwrap_or_default();

        let subtotal = explicit_amount(v, SUBTOTAL_KEYS)
            .unwrap_or_else(|| items.iter().map(|it| it.total_price).sum());
        let delivery_fee = non_negative(number_at(v, DELIVERY_FEE_KEYS).unwrap_or(0.0));
        let tax = non_negative(number_at(v, TAX_KEYS).unwrap_or(0.0));
        let grand_total =
            explicit_amount(v, GRAND_TOTAL_KEYS).unwrap_or(subtotal + delivery_fee + tax);

        let (created_at, created_at_inferred) =
            match first_present(v, CREATED_KEYS).and_then(parse_timestamp) {
                Some(ts) => (ts, false),
                None => {
                    tracing::debug!("order {} has no usable created-at; using now", id);
                    (self.now, true)
                }
            };

        let event_date = text_at(v, EVENT_DATE_KEYS).unwrap_or_else(|| to_iso(&created_at));
        let event_time = text_at(v, EVENT_TIME_KEYS).unwrap_or_default();

        let guest_count = number_at(v, GUEST_KEYS)
            .map(|n| non_negative(n).floor().min(u32::MAX as f64) as u32)
            .unwrap_or(0);

        let status = text_at(v, &["/status"])
            .map(|s| OrderStatus::from_backend_token(&s))
            .unwrap_or_default();

        Order {
            id,
            customer_name: text_at(v, CUSTOMER_KEYS).unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string()),
            phone_number: text_at(v, PHONE_KEYS).unwrap_or_else(|| "-".to_string()),
            guest_count,
            delivery_type: text_at(v, DELIVERY_TYPE_KEYS).unwrap_or_else(|| "-".to_string()),
            address: text_at(v, ADDRESS_KEYS),
            status,
            currency: text_at(v, &["/currency"]).unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            created_at,
            created_at_inferred,
            event_date,
            event_time,
            items,
            subtotal,
            delivery_fee,
            tax,
            grand_total,
            special_instructions: text_at(v, NOTES_KEYS),
        }
    }

    fn items(&self, raw: &Value) -> Vec<OrderItem> {
        let Some(arr) = raw.as_array() else {
            return Vec::new();
        };
        arr.iter()
            .enumerate()
            .map(|(idx, it)| {
                let quantity = non_negative(number_at(it, ITEM_QTY_KEYS).unwrap_or(1.0));
                let unit_price = non_negative(number_at(it, ITEM_UNIT_KEYS).unwrap_or(0.0));
                let total_price = non_negative(
                    number_at(it, ITEM_TOTAL_KEYS).unwrap_or(quantity * unit_price),
                );
                OrderItem {
                    id: text_at(it, ITEM_ID_KEYS).unwrap_or_else(|| idx.to_string()),
                    name: text_at(it, ITEM_NAME_KEYS).unwrap_or_else(|| "Item".to_string()),
                    kind: text_at(it, ITEM_TYPE_KEYS).unwrap_or_else(|| "Food".to_string()),
                    quantity,
                    unit_price,
                    total_price,
                }
            })
            .collect()
    }
}

/// A backend-supplied amount counts only when it is a positive number;
/// zero or garbage falls through to the derived value.
fn explicit_amount(v: &Value, pointers: &[&str]) -> Option<f64> {
    number_at(v, pointers)
        .map(non_negative)
        .filter(|n| *n > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 20, 12, 0, 0).unwrap()
    }

    fn normalize(raw: Value) -> Vec<Order> {
        Normalizer::at(fixed_now()).orders(raw.as_array().unwrap())
    }

    #[test]
    fn test_missing_ids_get_positional_placeholders() {
        let orders = normalize(json!([
            { "customer_name": "A", "grand_total": 10 },
            { "order_id": "ORD-7", "customer_name": "B", "grand_total": 10 },
            { "customer_name": "C", "grand_total": 10 },
        ]));
        let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["TEMP-0", "ORD-7", "TEMP-2"]);
    }

    #[test]
    fn test_placeholder_index_counts_dropped_records() {
        let orders = normalize(json!([
            {},
            { "customer_name": "Kept", "grand_total": 5 },
        ]));
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, "TEMP-1");
    }

    #[test]
    fn test_alternate_keys_resolve() {
        let orders = normalize(json!([{
            "id": 99,
            "customer": { "name": "Meera", "phone": "555-0101" },
            "event": { "date": "2025-06-01", "time": "18:30", "guest_count": "40" },
            "delivery": { "type": "Delivery", "address": { "line1": "12 Park St" } },
            "pricing": { "subtotal": "200", "delivery_fee": 15, "tax": 16.5, "total": 231.5 },
            "status": "PREPARING",
            "notes": "No nuts",
            "createdAt": 1_717_000_000
        }]));
        let o = &orders[0];
        assert_eq!(o.id, "99");
        assert_eq!(o.customer_name, "Meera");
        assert_eq!(o.phone_number, "555-0101");
        assert_eq!(o.guest_count, 40);
        assert_eq!(o.delivery_type, "Delivery");
        assert_eq!(o.address.as_deref(), Some("12 Park St"));
        assert_eq!(o.event_date, "2025-06-01");
        assert_eq!(o.event_time, "18:30");
        assert_eq!(o.status, OrderStatus::Preparing);
        assert_eq!(o.subtotal, 200.0);
        assert_eq!(o.grand_total, 231.5);
        assert_eq!(o.special_instructions.as_deref(), Some("No nuts"));
        assert!(!o.created_at_inferred);
        assert_eq!(to_iso(&o.created_at), "2024-05-29T16:26:40.000Z");
    }

    #[test]
    fn test_defaults_for_sparse_record() {
        let orders = normalize(json!([{ "order_id": "X1", "grand_total_usd": 12 }]));
        let o = &orders[0];
        assert_eq!(o.customer_name, "Unknown");
        assert_eq!(o.phone_number, "-");
        assert_eq!(o.delivery_type, "-");
        assert_eq!(o.guest_count, 0);
        assert_eq!(o.currency, "USD");
        assert_eq!(o.status, OrderStatus::Confirmed);
        assert_eq!(o.address, None);
        assert_eq!(o.event_time, "");
        assert!(o.created_at_inferred);
        assert_eq!(o.created_at, fixed_now());
        assert_eq!(o.event_date, to_iso(&fixed_now()));
    }

    #[test]
    fn test_item_totals_are_derived() {
        let orders = normalize(json!([{
            "customer_name": "Ravi",
            "items": [
                { "item_name": "Paneer Tray", "qty": 3, "unit_price": "12.50" },
                { "name": "Samosa Box", "quantity": 2, "price": 4.25, "total": 9 },
                { "name": "Chutney" }
            ]
        }]));
        assert_eq!(orders[0].item_count(), 3);
        let items = &orders[0].items;
        assert_eq!(items[0].total_price, 37.5);
        assert_eq!(items[1].total_price, 9.0);
        assert_eq!(items[2].quantity, 1.0);
        assert_eq!(items[2].total_price, 0.0);
        assert_eq!(items[2].kind, "Food");
        assert_eq!(items[2].id, "2");
    }

    #[test]
    fn test_totals_fall_back_to_components() {
        let orders = normalize(json!([{
            "customer_name": "Ravi",
            "ordered_items": [
                { "name": "Tray", "quantity": 2, "unitPrice": 50 },
                { "name": "Box", "quantity": 1, "unitPrice": 20.1 }
            ],
            "delivery_fee": "10",
            "tax_usd": 9.61,
            "subtotal": 0
        }]));
        let o = &orders[0];
        assert!((o.subtotal - 120.1).abs() < 1e-9);
        assert!((o.grand_total - (o.subtotal + o.delivery_fee + o.tax)).abs() < 1e-9);
    }

    #[test]
    fn test_amounts_are_never_negative_or_nan() {
        let orders = normalize(json!([{
            "customer_name": "Z",
            "delivery_fee": -5,
            "tax": "n/a",
            "subtotal": "abc",
            "items": [{ "quantity": "two", "unit_price": 10 }]
        }]));
        let o = &orders[0];
        assert_eq!(o.delivery_fee, 0.0);
        assert_eq!(o.tax, 0.0);
        assert_eq!(o.subtotal, 0.0);
        assert_eq!(o.grand_total, 0.0);
        assert!(o.grand_total.is_finite());
    }

    #[test]
    fn test_unknown_and_free_orders_are_dropped() {
        let orders = normalize(json!([
            { "order_id": "1" },
            { "order_id": "2", "grand_total": 30 },
            { "order_id": "3", "customer_name": "Named" },
        ]));
        let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn test_status_mapping_and_completed() {
        let orders = normalize(json!([
            { "customer_name": "a", "status": "completed" },
            { "customer_name": "b", "status": "weird" },
            { "customer_name": "c", "status": "cancelled" },
        ]));
        let statuses: Vec<OrderStatus> = orders.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![OrderStatus::Delivered, OrderStatus::Confirmed, OrderStatus::Cancelled]
        );
    }

    #[test]
    fn test_unparseable_created_at_uses_now() {
        let orders = normalize(json!([{ "customer_name": "a", "created_at": "not a date" }]));
        assert!(orders[0].created_at_inferred);
        assert_eq!(orders[0].created_at, fixed_now());
    }
}
