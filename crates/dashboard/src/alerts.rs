//! Low-stock / out-of-stock alerts.

use serde::Serialize;

use stockflow_core::ProductId;
use stockflow_inventory::{Product, StockLevel};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    // Declaration order is urgency order.
    OutOfStock,
    LowStock,
}

impl AlertType {
    pub fn for_level(level: StockLevel) -> Option<Self> {
        match level {
            StockLevel::OutOfStock => Some(AlertType::OutOfStock),
            StockLevel::LowStock => Some(AlertType::LowStock),
            StockLevel::Healthy => None,
        }
    }
}

/// One alert per product that is out of stock or at/below its minimum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAlert {
    pub product_id: ProductId,
    pub product_name: String,
    pub product_sku: String,
    pub current_stock: u32,
    pub minimum_stock: u32,
    pub alert_type: AlertType,
}

impl StockAlert {
    fn from_product(product: &Product, alert_type: AlertType) -> Self {
        Self {
            product_id: product.id_typed().clone(),
            product_name: product.name().to_string(),
            product_sku: product.sku().to_string(),
            current_stock: product.current_stock(),
            minimum_stock: product.minimum_stock(),
            alert_type,
        }
    }

    /// Units needed to get back above the configured minimum.
    pub fn shortfall(&self) -> u32 {
        self.minimum_stock.saturating_add(1).saturating_sub(self.current_stock)
    }
}

/// Derive the alert list, most urgent first.
///
/// Out-of-stock alerts precede low-stock ones; ties are broken by product
/// name, then by product id, so the order is fully deterministic.
pub fn generate_alerts(products: &[Product]) -> Vec<StockAlert> {
    let mut alerts: Vec<StockAlert> = products
        .iter()
        .filter_map(|p| {
            AlertType::for_level(p.stock_level()).map(|ty| StockAlert::from_product(p, ty))
        })
        .collect();

    alerts.sort_by(|a, b| {
        a.alert_type
            .cmp(&b.alert_type)
            .then_with(|| a.product_name.cmp(&b.product_name))
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    alerts
}

/// The first `n` alerts, for compact previews.
pub fn top_alerts(alerts: &[StockAlert], n: usize) -> &[StockAlert] {
    &alerts[..alerts.len().min(n)]
}
