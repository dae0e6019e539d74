//! Product projection and stock classification.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use stockflow_core::{DomainError, DomainResult, Entity, ProductId};

/// Stock classification of a product against its configured minimum.
///
/// The three levels are mutually exclusive: a product with zero stock is out of
/// stock regardless of its minimum.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockLevel {
    OutOfStock,
    LowStock,
    Healthy,
}

impl StockLevel {
    pub fn classify(current_stock: u32, minimum_stock: u32) -> Self {
        if current_stock == 0 {
            StockLevel::OutOfStock
        } else if current_stock <= minimum_stock {
            StockLevel::LowStock
        } else {
            StockLevel::Healthy
        }
    }

    pub fn needs_attention(self) -> bool {
        self != StockLevel::Healthy
    }
}

/// A product as seen by the engine.
///
/// Stock fields are only changed through the stock ledger; everything else is
/// descriptive and never influences invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: ProductId,
    sku: String,
    name: String,
    price: Decimal,
    current_stock: u32,
    minimum_stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Build a product, rejecting a negative price.
    pub fn new(
        id: ProductId,
        sku: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
        current_stock: u32,
        minimum_stock: u32,
    ) -> DomainResult<Self> {
        if price < Decimal::ZERO {
            return Err(DomainError::validation(format!("price cannot be negative: {price}")));
        }
        Ok(Self {
            id,
            sku: sku.into(),
            name: name.into(),
            price,
            current_stock,
            minimum_stock,
            category: None,
            description: None,
            image_url: None,
            created_at: None,
            updated_at: None,
        })
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }

    pub fn with_timestamps(
        mut self,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    pub fn id_typed(&self) -> &ProductId {
        &self.id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn current_stock(&self) -> u32 {
        self.current_stock
    }

    pub fn minimum_stock(&self) -> u32 {
        self.minimum_stock
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn stock_level(&self) -> StockLevel {
        StockLevel::classify(self.current_stock, self.minimum_stock)
    }

    /// Value of the units on hand (`price × current_stock`).
    pub fn stock_value(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.current_stock))
    }

    pub(crate) fn with_stock(&self, current_stock: u32) -> Self {
        Self {
            current_stock,
            ..self.clone()
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Draft of a product to be created by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub price: Decimal,
    pub current_stock: u32,
    pub minimum_stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl NewProduct {
    /// Check the draft on its own and against the products already known.
    ///
    /// SKUs are compared case-insensitively after trimming.
    pub fn validate(&self, existing: &[Product]) -> DomainResult<()> {
        let sku = self.sku.trim();
        if sku.is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.price < Decimal::ZERO {
            return Err(DomainError::validation("price cannot be negative"));
        }
        if existing.iter().any(|p| p.sku().trim().eq_ignore_ascii_case(sku)) {
            return Err(DomainError::conflict(format!("sku already exists: {sku}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(stock: u32, min: u32) -> Product {
        Product::new(ProductId::from(1), "CAM-001", "Black Tee", Decimal::new(2990, 2), stock, min)
            .unwrap()
    }

    fn draft(sku: &str, name: &str) -> NewProduct {
        NewProduct {
            sku: sku.to_string(),
            name: name.to_string(),
            price: Decimal::new(999, 2),
            current_stock: 0,
            minimum_stock: 1,
            category: None,
            description: None,
            image_url: None,
        }
    }

    #[test]
    fn classification_is_mutually_exclusive() {
        assert_eq!(product(0, 5).stock_level(), StockLevel::OutOfStock);
        assert_eq!(product(3, 5).stock_level(), StockLevel::LowStock);
        assert_eq!(product(5, 5).stock_level(), StockLevel::LowStock);
        assert_eq!(product(6, 5).stock_level(), StockLevel::Healthy);
        assert_eq!(product(0, 0).stock_level(), StockLevel::OutOfStock);
        assert_eq!(product(1, 0).stock_level(), StockLevel::Healthy);
    }

    #[test]
    fn negative_price_is_rejected() {
        let err = Product::new(ProductId::from(1), "X", "X", Decimal::new(-1, 2), 0, 0).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn stock_value_multiplies_price_by_units() {
        assert_eq!(product(3, 0).stock_value(), Decimal::new(8970, 2));
    }

    #[test]
    fn draft_rejects_blank_fields_and_duplicate_sku() {
        let existing = vec![product(1, 1)];
        assert!(matches!(draft(" ", "A").validate(&existing), Err(DomainError::Validation(_))));
        assert!(matches!(draft("B-1", " ").validate(&existing), Err(DomainError::Validation(_))));
        assert!(matches!(
            draft("cam-001", "Other").validate(&existing),
            Err(DomainError::Conflict(_))
        ));
        assert!(draft("CAL-002", "Jeans").validate(&existing).is_ok());
    }
}
