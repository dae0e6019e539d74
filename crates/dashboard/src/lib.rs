//! Dashboard read side.
//!
//! Pure readers over the product and movement collections: headline
//! statistics, stock alerts and list queries. Nothing here keeps state; every
//! function can be re-run on the same inputs and returns the same output.

pub mod alerts;
pub mod query;
pub mod stats;

pub use alerts::{AlertType, StockAlert, generate_alerts, top_alerts};
pub use query::{recent_movements, search_movements, search_products};
pub use stats::{DashboardStats, compute_stats, movements_on_day_of};
