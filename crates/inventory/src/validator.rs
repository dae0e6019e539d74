//! Movement validation against the current product projection.

use thiserror::Error;

use stockflow_core::{ProductId, find_by_id};

use crate::movement::{MovementDetails, MovementRequest, Quantity};
use crate::product::Product;
use crate::reason;

/// Why a movement request was refused. Never reaches the network.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("quantity must be a positive integer (got {0})")]
    InvalidQuantity(i64),

    #[error("a reason is required (\"other\" needs an elaboration)")]
    MissingReason,

    #[error("insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    #[error("receipt of {requested} would exceed the representable stock of {product_id} ({available} on hand)")]
    StockOverflow {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },
}

impl ValidationError {
    /// Name of the request field the error belongs to, for field-level display.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::ProductNotFound(_) => "productId",
            ValidationError::InvalidQuantity(_)
            | ValidationError::InsufficientStock { .. }
            | ValidationError::StockOverflow { .. } => "quantity",
            ValidationError::MissingReason => "reason",
        }
    }
}

/// A movement that passed validation and is ready for the ledger.
///
/// Only [`validate`] constructs this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMovement {
    product_id: ProductId,
    details: MovementDetails,
}

impl ValidatedMovement {
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn details(&self) -> &MovementDetails {
        &self.details
    }

    pub fn quantity(&self) -> Quantity {
        self.details.quantity
    }
}

/// Check a request against the products currently known.
///
/// Side-effect-free. The returned movement has its reason normalized: the
/// "other" sentinel is replaced by the trimmed elaboration, and blank notes
/// are dropped.
pub fn validate(
    products: &[Product],
    request: &MovementRequest,
) -> Result<ValidatedMovement, ValidationError> {
    let product = find_by_id(products, &request.product_id)
        .ok_or_else(|| ValidationError::ProductNotFound(request.product_id.clone()))?;

    let quantity =
        Quantity::new(request.quantity).ok_or(ValidationError::InvalidQuantity(request.quantity))?;

    let reason = normalize_reason(&request.reason, request.elaboration.as_deref())?;

    let available = product.current_stock();
    if request.movement_type.decreases_stock() {
        if quantity.get() > available {
            return Err(ValidationError::InsufficientStock {
                product_id: request.product_id.clone(),
                requested: quantity.get(),
                available,
            });
        }
    } else if available.checked_add(quantity.get()).is_none() {
        return Err(ValidationError::StockOverflow {
            product_id: request.product_id.clone(),
            requested: quantity.get(),
            available,
        });
    }

    let notes = request
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    Ok(ValidatedMovement {
        product_id: request.product_id.clone(),
        details: MovementDetails {
            movement_type: request.movement_type,
            quantity,
            reason,
            responsible_user: request.responsible_user.trim().to_string(),
            notes,
        },
    })
}

fn normalize_reason(reason: &str, elaboration: Option<&str>) -> Result<String, ValidationError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(ValidationError::MissingReason);
    }
    if reason::is_other(reason) {
        return elaboration
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .ok_or(ValidationError::MissingReason);
    }
    Ok(reason.to_string())
}
