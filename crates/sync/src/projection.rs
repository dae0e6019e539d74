//! Local projection of the remote store, plus the views derived from it.

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use stockflow_core::{DomainError, DomainResult, ProductId, find_by_id, position_of};
use stockflow_dashboard::{DashboardStats, StockAlert, compute_stats, generate_alerts};
use stockflow_inventory::{Movement, Product, ValidatedMovement, ledger};

/// Products and movements as last known to this client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    products: Vec<Product>,
    movements: Vec<Movement>,
}

impl Projection {
    pub fn new(products: Vec<Product>, movements: Vec<Movement>) -> Self {
        Self {
            products,
            movements,
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        find_by_id(&self.products, id)
    }

    /// Apply a validated movement to the matching product through the ledger.
    pub fn apply(&mut self, movement: &ValidatedMovement) -> DomainResult<()> {
        let idx = position_of(&self.products, movement.product_id()).ok_or_else(|| {
            DomainError::invariant(format!(
                "validated movement for unknown product {}",
                movement.product_id()
            ))
        })?;
        let updated = ledger::apply(&self.products[idx], movement)?;
        self.products[idx] = updated;
        Ok(())
    }
}

/// Dashboard views computed from a projection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedViews {
    pub stats: DashboardStats,
    pub alerts: Vec<StockAlert>,
}

impl DerivedViews {
    pub fn derive<Tz: TimeZone>(projection: &Projection, now: &DateTime<Tz>) -> Self {
        Self {
            stats: compute_stats(projection.products(), projection.movements(), now),
            alerts: generate_alerts(projection.products()),
        }
    }
}
