//! In-memory order list for one open order screen, plus the status-update
//! round trip.
//!
//! Async work is split into `begin_*` / `complete_*` halves so the board can
//! sit behind a lock while requests are in flight:
//!
//! - a load completion is applied only if no newer load started and the
//!   board is still open;
//! - at most one status update per order id may be in flight;
//! - a failed update leaves local state untouched, a successful one patches
//!   the matching list entry and the open detail from the same result.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;

use crate::error::{ConsoleError, Result};
use crate::models::{Order, OrderStatus};
use crate::normalize::Normalizer;
use crate::view::{self, OrderQuery, OrderView};

pub const LOAD_ERROR: &str = "Failed to load orders";

/// The two order calls the board needs.
#[async_trait]
pub trait OrdersBackend: Send + Sync {
    async fn fetch_orders(&self) -> Result<Vec<Value>>;

    async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTicket {
    order_id: String,
    status: OrderStatus,
}

impl StatusTicket {
    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }
}

#[derive(Debug, Default)]
pub struct OrderBoard {
    orders: Vec<Order>,
    detail: Option<Order>,
    error: Option<String>,
    loading: bool,
    generation: u64,
    closed: bool,
    in_flight: HashSet<String>,
}

impl OrderBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn detail(&self) -> Option<&Order> {
        self.detail.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn find(&self, order_id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == order_id)
    }

    pub fn view(&self, query: &OrderQuery) -> OrderView<'_> {
        view::compute(&self.orders, query)
    }

    pub fn open_detail(&mut self, order_id: &str) -> Result<&Order> {
        let order = self
            .find(order_id)
            .cloned()
            .ok_or_else(|| ConsoleError::UnknownOrder(order_id.to_string()))?;
        Ok(self.detail.insert(order))
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    /// Start a load. Any earlier ticket becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Apply a fetched batch. A failed fetch empties the list and records
    /// [`LOAD_ERROR`]; stale tickets change nothing.
    pub fn finish_load(&mut self, ticket: LoadTicket, fetched: Result<Vec<Value>>) -> Result<usize> {
        if self.closed || ticket.generation != self.generation {
            tracing::warn!("discarding order load #{}", ticket.generation);
            return Err(ConsoleError::Stale);
        }
        self.loading = false;
        match fetched {
            Ok(raw) => {
                self.orders = Normalizer::new().orders(&raw);
                self.error = None;
                self.detail = self
                    .detail
                    .take()
                    .and_then(|d| self.orders.iter().find(|o| o.id == d.id).cloned());
                tracing::info!("order board holds {} orders", self.orders.len());
                Ok(self.orders.len())
            }
            Err(e) => {
                tracing::error!("{}: {}", LOAD_ERROR, e);
                self.orders.clear();
                self.detail = None;
                self.error = Some(LOAD_ERROR.to_string());
                Err(e)
            }
        }
    }

    pub async fn refresh<B: OrdersBackend + ?Sized>(&mut self, backend: &B) -> Result<usize> {
        let ticket = self.begin_load();
        let fetched = backend.fetch_orders().await;
        self.finish_load(ticket, fetched)
    }

    /// Reserve a status update. Fails if the order is unknown or already
    /// has an update in flight.
    pub fn begin_status_update(&mut self, order_id: &str, status: OrderStatus) -> Result<StatusTicket> {
        if self.closed {
            return Err(ConsoleError::Stale);
        }
        if self.find(order_id).is_none() {
            return Err(ConsoleError::UnknownOrder(order_id.to_string()));
        }
        if !self.in_flight.insert(order_id.to_string()) {
            tracing::warn!("rejecting concurrent status update for {}", order_id);
            return Err(ConsoleError::UpdateInFlight(order_id.to_string()));
        }
        Ok(StatusTicket {
            order_id: order_id.to_string(),
            status,
        })
    }

    /// Apply the outcome of a status update.
    pub fn complete_status_update(&mut self, ticket: StatusTicket, outcome: Result<()>) -> Result<()> {
        self.in_flight.remove(&ticket.order_id);
        if self.closed {
            return Err(ConsoleError::Stale);
        }
        if let Err(e) = outcome {
            tracing::error!("status update for {} failed: {}", ticket.order_id, e);
            return Err(e);
        }
        if let Some(order) = self.orders.iter_mut().find(|o| o.id == ticket.order_id) {
            order.status = ticket.status;
        }
        if let Some(detail) = self.detail.as_mut().filter(|d| d.id == ticket.order_id) {
            detail.status = ticket.status;
        }
        tracing::info!("order {} is now {}", ticket.order_id, ticket.status);
        Ok(())
    }

    /// Single attempt, no retry.
    pub async fn update_status<B: OrdersBackend + ?Sized>(
        &mut self,
        backend: &B,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<()> {
        let ticket = self.begin_status_update(order_id, status)?;
        let outcome = backend.update_order_status(order_id, status).await;
        self.complete_status_update(ticket, outcome)
    }

    /// The screen went away; later completions are ignored.
    pub fn close(&mut self) {
        self.closed = true;
        self.loading = false;
        self.in_flight.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        orders: Vec<Value>,
        fail_fetch: bool,
        fail_update: bool,
        updates: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl OrdersBackend for FakeBackend {
        async fn fetch_orders(&self) -> Result<Vec<Value>> {
            if self.fail_fetch {
                return Err(ConsoleError::Status {
                    status: 503,
                    message: "Failed to fetch orders".to_string(),
                });
            }
            Ok(self.orders.clone())
        }

        async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> Result<()> {
            if self.fail_update {
                return Err(ConsoleError::Status {
                    status: 500,
                    message: "Failed to update status".to_string(),
                });
            }
            self.updates
                .lock()
                .unwrap()
                .push((order_id.to_string(), status.backend_token()));
            Ok(())
        }
    }

    fn backend() -> FakeBackend {
        FakeBackend {
            orders: vec![
                json!({ "order_id": "A", "customer_name": "Anita", "status": "confirmed", "grand_total": 50 }),
                json!({ "order_id": "B", "customer_name": "Bilal", "status": "preparing", "grand_total": 70 }),
                json!({ "order_id": "C", "customer_name": "Chen", "status": "ready", "grand_total": 20 }),
            ],
            ..Default::default()
        }
    }

    async fn loaded(backend: &FakeBackend) -> OrderBoard {
        let mut board = OrderBoard::new();
        board.refresh(backend).await.unwrap();
        board
    }

    #[tokio::test]
    async fn test_refresh_normalizes() {
        let board = loaded(&backend()).await;
        assert_eq!(board.orders().len(), 3);
        assert!(!board.is_loading());
        assert_eq!(board.find("B").unwrap().status, OrderStatus::Preparing);
    }

    #[tokio::test]
    async fn test_failed_load_empties_list_and_sets_error() {
        let ok = backend();
        let mut board = loaded(&ok).await;
        let failing = FakeBackend {
            fail_fetch: true,
            ..Default::default()
        };
        assert!(board.refresh(&failing).await.is_err());
        assert!(board.orders().is_empty());
        assert_eq!(board.error(), Some(LOAD_ERROR));
    }

    #[tokio::test]
    async fn test_successful_update_patches_one_order_and_detail() {
        let backend = backend();
        let mut board = loaded(&backend).await;
        board.open_detail("B").unwrap();

        board
            .update_status(&backend, "B", OrderStatus::Delivered)
            .await
            .unwrap();

        assert_eq!(board.find("A").unwrap().status, OrderStatus::Confirmed);
        assert_eq!(board.find("B").unwrap().status, OrderStatus::Delivered);
        assert_eq!(board.find("C").unwrap().status, OrderStatus::Ready);
        assert_eq!(board.detail().unwrap().status, OrderStatus::Delivered);
        assert_eq!(
            *backend.updates.lock().unwrap(),
            vec![("B".to_string(), "delivered".to_string())]
        );
    }

    #[tokio::test]
    async fn test_failed_update_leaves_state_untouched() {
        let mut failing = backend();
        failing.fail_update = true;
        let mut board = loaded(&failing).await;
        board.open_detail("A").unwrap();
        let before = board.orders().to_vec();

        let err = board
            .update_status(&failing, "A", OrderStatus::Cancelled)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Failed to update status"));
        assert_eq!(board.orders(), before.as_slice());
        assert_eq!(board.detail().unwrap().status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_detail_on_other_order_is_not_patched() {
        let backend = backend();
        let mut board = loaded(&backend).await;
        board.open_detail("C").unwrap();
        board
            .update_status(&backend, "A", OrderStatus::Preparing)
            .await
            .unwrap();
        assert_eq!(board.detail().unwrap().status, OrderStatus::Ready);
    }

    #[tokio::test]
    async fn test_concurrent_update_for_same_order_is_rejected() {
        let mut board = loaded(&backend()).await;
        let first = board.begin_status_update("A", OrderStatus::Ready).unwrap();
        assert!(matches!(
            board.begin_status_update("A", OrderStatus::Cancelled),
            Err(ConsoleError::UpdateInFlight(_))
        ));
        // a different order is independent
        let other = board.begin_status_update("B", OrderStatus::Ready).unwrap();

        board.complete_status_update(first, Ok(())).unwrap();
        board.complete_status_update(other, Ok(())).unwrap();
        assert!(board.begin_status_update("A", OrderStatus::Cancelled).is_ok());
    }

    #[tokio::test]
    async fn test_unknown_order_update_is_rejected() {
        let mut board = loaded(&backend()).await;
        assert!(matches!(
            board.begin_status_update("Z", OrderStatus::Ready),
            Err(ConsoleError::UnknownOrder(_))
        ));
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let mut board = OrderBoard::new();
        let first = board.begin_load();
        let second = board.begin_load();

        let newer = vec![json!({ "order_id": "NEW", "customer_name": "N" })];
        board.finish_load(second, Ok(newer)).unwrap();

        let older = vec![json!({ "order_id": "OLD", "customer_name": "O" })];
        assert!(matches!(board.finish_load(first, Ok(older)), Err(ConsoleError::Stale)));
        assert_eq!(board.orders()[0].id, "NEW");
    }

    #[test]
    fn test_closed_board_ignores_completions() {
        let mut board = OrderBoard::new();
        let ticket = board.begin_load();
        board.close();
        assert!(board.is_closed());
        assert!(!board.is_loading());
        let raw = vec![json!({ "order_id": "X", "customer_name": "X" })];
        assert!(board.finish_load(ticket, Ok(raw)).is_err());
        assert!(board.orders().is_empty());
    }

    #[tokio::test]
    async fn test_reload_keeps_open_detail_in_sync() {
        let mut backend = backend();
        let mut board = loaded(&backend).await;
        board.open_detail("C").unwrap();

        backend.orders[2]["status"] = json!("delivered");
        board.refresh(&backend).await.unwrap();
        assert_eq!(board.detail().unwrap().status, OrderStatus::Delivered);

        backend.orders.truncate(2);
        board.refresh(&backend).await.unwrap();
        assert!(board.detail().is_none());
    }
}
