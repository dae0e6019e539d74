//! Stock movements: the append-only log of stock-changing events.

use core::num::NonZeroU32;

use chrono::{DateTime, Utc};
use serde::Serialize;

use stockflow_core::{Entity, MovementId, ProductId, ValueObject};

/// Canonical movement kind.
///
/// External vocabularies (legacy names, UI shorthands) are translated into this
/// type at the sync boundary and never cross into the ledger as strings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    Receipt,
    Issue,
    Defect,
    Transfer,
}

/// Whether a movement adds stock or removes it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl MovementType {
    pub const ALL: [MovementType; 4] = [
        MovementType::Receipt,
        MovementType::Issue,
        MovementType::Defect,
        MovementType::Transfer,
    ];

    pub fn direction(self) -> Direction {
        match self {
            MovementType::Receipt => Direction::Inbound,
            MovementType::Issue | MovementType::Defect | MovementType::Transfer => {
                Direction::Outbound
            }
        }
    }

    pub fn decreases_stock(self) -> bool {
        self.direction() == Direction::Outbound
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MovementType::Receipt => "RECEIPT",
            MovementType::Issue => "ISSUE",
            MovementType::Defect => "DEFECT",
            MovementType::Transfer => "TRANSFER",
        }
    }
}

impl core::fmt::Display for MovementType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A strictly positive number of units.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// Accepts `1..=u32::MAX`; anything else is not a quantity.
    pub fn new(value: i64) -> Option<Self> {
        u32::try_from(value).ok().and_then(NonZeroU32::new).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl ValueObject for Quantity {}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Product snapshot carried by a movement record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
}

impl ValueObject for ProductRef {}

/// The payload of a movement, shared by accepted records and pending submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementDetails {
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: Quantity,
    pub reason: String,
    pub responsible_user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// An accepted movement. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    id: MovementId,
    product: ProductRef,
    #[serde(flatten)]
    details: MovementDetails,
    timestamp: DateTime<Utc>,
}

impl Movement {
    pub fn new(
        id: MovementId,
        product: ProductRef,
        details: MovementDetails,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            product,
            details,
            timestamp,
        }
    }

    pub fn product(&self) -> &ProductRef {
        &self.product
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    pub fn details(&self) -> &MovementDetails {
        &self.details
    }

    pub fn movement_type(&self) -> MovementType {
        self.details.movement_type
    }

    pub fn quantity(&self) -> Quantity {
        self.details.quantity
    }

    pub fn reason(&self) -> &str {
        &self.details.reason
    }

    pub fn responsible_user(&self) -> &str {
        &self.details.responsible_user
    }

    pub fn notes(&self) -> Option<&str> {
        self.details.notes.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Entity for Movement {
    type Id = MovementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A movement as requested by the presentation layer, before validation.
///
/// `quantity` is kept raw so that zero and negative inputs can be reported
/// rather than being unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementRequest {
    pub product_id: ProductId,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub reason: String,
    /// Free text required when `reason` is the "other" sentinel.
    pub elaboration: Option<String>,
    pub responsible_user: String,
    pub notes: Option<String>,
}

impl MovementRequest {
    pub fn new(
        product_id: ProductId,
        movement_type: MovementType,
        quantity: i64,
        reason: impl Into<String>,
        responsible_user: impl Into<String>,
    ) -> Self {
        Self {
            product_id,
            movement_type,
            quantity,
            reason: reason.into(),
            elaboration: None,
            responsible_user: responsible_user.into(),
            notes: None,
        }
    }

    pub fn with_elaboration(mut self, elaboration: impl Into<String>) -> Self {
        self.elaboration = Some(elaboration.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_receipts_increase_stock() {
        for ty in MovementType::ALL {
            assert_eq!(ty.decreases_stock(), ty != MovementType::Receipt, "{ty}");
        }
    }

    #[test]
    fn quantity_rejects_zero_negative_and_oversized() {
        assert!(Quantity::new(0).is_none());
        assert!(Quantity::new(-3).is_none());
        assert!(Quantity::new(i64::from(u32::MAX) + 1).is_none());
        assert_eq!(Quantity::new(5).map(Quantity::get), Some(5));
    }
}
