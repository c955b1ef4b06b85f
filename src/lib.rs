//! # catering-console-rs
//!
//! Client library for a catering-order management backend: order ingestion,
//! the order list screen (search, filter, sort, paging), status updates, and
//! the dashboard, revenue and customer summaries.
//!
//! ## Layers
//!
//! | Module | Role |
//! |--------|------|
//! | `api` | HTTP client (`ConsoleApi`) for every backend endpoint |
//! | `session` | Explicit login/session state; bearer token passing |
//! | `normalize` | Loosely-typed backend JSON → canonical `Order` |
//! | `view` | Search / status filter / sort / pagination + KPIs |
//! | `board` | Owned order list, load sequencing, status updates |
//! | `summary` | Dashboard, revenue and customer derivations |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use catering_console::{ConsoleApi, OrderBoard, OrderQuery, OrderStatus};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = ConsoleApi::new("http://127.0.0.1:9002");
//!     let mut board = OrderBoard::new();
//!     board.refresh(&api).await?;
//!
//!     let mut query = OrderQuery::default();
//!     query.set_search("555");
//!     let view = board.view(&query);
//!     println!("{} matches, revenue {:.2}", view.kpis.total_orders, view.kpis.revenue);
//!     for order in view.rows() {
//!         println!("{} {} {}", order.id, order.customer_name, order.status);
//!     }
//!
//!     board.update_status(&api, "ORD-1001", OrderStatus::Preparing).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! cargo run --release -- orders --status Preparing --sort grandTotal:desc
//! cargo run --release -- set-status ORD-1001 Ready
//! cargo run --release -- revenue --days 30
//! ```

pub mod api;
pub mod board;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod session;
pub mod summary;
pub mod utils;
pub mod view;

pub use api::ConsoleApi;
pub use board::{OrderBoard, OrdersBackend};
pub use config::{load_config, Config};
pub use error::{ConsoleError, Result};
pub use models::{Order, OrderItem, OrderStatus};
pub use normalize::{normalize_orders, Normalizer};
pub use session::{AuthUser, Session};
pub use view::{OrderQuery, OrderView, SortColumn, SortDirection, SortSpec, StatusFilter};
