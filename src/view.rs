//! Search, status filter, sort and pagination over canonical orders.
//!
//! [`compute`] is pure: it never touches the order list, and the KPIs and
//! the visible page are cut from the same filtered + sorted intermediate.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::models::{Order, OrderStatus};

pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortColumn {
    CreatedAt,
    CustomerName,
    GrandTotal,
    Id,
}

impl SortColumn {
    /// Direction used when a column is first selected.
    pub fn default_direction(self) -> SortDirection {
        match self {
            SortColumn::CreatedAt => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    fn compare(self, a: &Order, b: &Order) -> Ordering {
        match self {
            SortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
            SortColumn::CustomerName => a
                .customer_name
                .to_lowercase()
                .cmp(&b.customer_name.to_lowercase())
                .then_with(|| a.customer_name.cmp(&b.customer_name)),
            SortColumn::GrandTotal => a.grand_total.total_cmp(&b.grand_total),
            SortColumn::Id => a.id.cmp(&b.id),
        }
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "createdAt" | "created_at" | "created" => Ok(SortColumn::CreatedAt),
            "customerName" | "customer_name" | "customer" => Ok(SortColumn::CustomerName),
            "grandTotal" | "grand_total" | "total" => Ok(SortColumn::GrandTotal),
            "id" | "orderId" | "order_id" => Ok(SortColumn::Id),
            other => Err(format!("unknown sort column '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    /// Newest first.
    fn default() -> Self {
        Self {
            column: SortColumn::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl SortSpec {
    /// Header-click behavior: the same column flips direction, a new column
    /// starts at its default direction.
    pub fn toggle(&mut self, column: SortColumn) {
        if self.column == column {
            self.direction = self.direction.flip();
        } else {
            self.column = column;
            self.direction = column.default_direction();
        }
    }

    fn compare(&self, a: &Order, b: &Order) -> Ordering {
        match self.direction {
            SortDirection::Asc => self.column.compare(a, b),
            SortDirection::Desc => self.column.compare(b, a),
        }
    }
}

/// `column` or `column:asc|desc`.
impl FromStr for SortSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (col, dir) = match s.split_once(':') {
            Some((c, d)) => (c, Some(d)),
            None => (s, None),
        };
        let column: SortColumn = col.parse()?;
        let direction = match dir {
            Some(d) => d.parse()?,
            None => column.default_direction(),
        };
        Ok(Self { column, direction })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    All,
    Only(OrderStatus),
}

impl StatusFilter {
    pub fn accepts(&self, status: OrderStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(s) => *s == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

/// Everything the order list screen lets the user change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderQuery {
    pub search: String,
    pub status: StatusFilter,
    pub sort: SortSpec,
    /// 1-based; clamped when the view is computed.
    pub page: usize,
}

impl Default for OrderQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: StatusFilter::All,
            sort: SortSpec::default(),
            page: 1,
        }
    }
}

impl OrderQuery {
    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
        self.page = 1;
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        self.status = status;
        self.page = 1;
    }

    pub fn toggle_sort(&mut self, column: SortColumn) {
        self.sort.toggle(column);
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }
}

/// Aggregates over the whole filtered set, not just the visible page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderKpis {
    pub total_orders: usize,
    pub revenue: f64,
    pub by_status: BTreeMap<OrderStatus, usize>,
}

impl OrderKpis {
    fn collect(orders: &[&Order]) -> Self {
        let mut by_status = BTreeMap::new();
        for o in orders {
            *by_status.entry(o.status).or_insert(0) += 1;
        }
        Self {
            total_orders: orders.len(),
            revenue: orders.iter().map(|o| o.grand_total).sum(),
            by_status,
        }
    }

    pub fn count(&self, status: OrderStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderView<'a> {
    /// All matches, sorted.
    pub filtered: Vec<&'a Order>,
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub kpis: OrderKpis,
}

impl<'a> OrderView<'a> {
    /// The slice for the current page.
    pub fn rows(&self) -> &[&'a Order] {
        let start = (self.page - 1) * self.page_size;
        let end = (start + self.page_size).min(self.filtered.len());
        if start >= end {
            return &[];
        }
        &self.filtered[start..end]
    }
}

pub fn compute<'a>(orders: &'a [Order], query: &OrderQuery) -> OrderView<'a> {
    let mut filtered: Vec<&Order> = orders
        .iter()
        .filter(|o| o.matches_search(&query.search))
        .filter(|o| query.status.accepts(o.status))
        .collect();

    // stable: ties keep fetch order
    filtered.sort_by(|a, b| query.sort.compare(a, b));

    let total_pages = filtered.len().div_ceil(PAGE_SIZE);
    let page = query.page.clamp(1, total_pages.max(1));
    let kpis = OrderKpis::collect(&filtered);

    OrderView {
        filtered,
        page,
        total_pages,
        page_size: PAGE_SIZE,
        kpis,
    }
}
