//! Inventory domain module.
//!
//! This crate contains business rules for stock, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage): the product
//! projection, the movement log types, movement validation and the stock
//! ledger that applies validated movements.

pub mod ledger;
pub mod movement;
pub mod product;
pub mod reason;
pub mod validator;

pub use ledger::{apply, projected_stock};
pub use movement::{
    Direction, Movement, MovementDetails, MovementRequest, MovementType, ProductRef, Quantity,
};
pub use product::{NewProduct, Product, StockLevel};
pub use reason::{OTHER_REASON, is_other, suggested_reasons};
pub use validator::{ValidatedMovement, ValidationError, validate};
