pub mod order;
pub mod settings;
pub mod status;
pub mod summary;

pub use order::{Order, OrderItem};
pub use settings::{Billing, Branding, LogoUpload, Notifications, Settings, UserMe, UserUpdate};
pub use status::OrderStatus;
pub use summary::{
    CustomerRow, CustomersSummary, DashboardSummary, DateRange, DeliverySplit, RevenuePoint,
    RevenueSummary, TopItem,
};
