//! Stock ledger: pure application of validated movements to products.

use stockflow_core::{DomainError, DomainResult};

use crate::movement::MovementType;
use crate::product::Product;
use crate::validator::ValidatedMovement;

/// Apply a validated movement to a product, returning the updated product.
///
/// `RECEIPT` adds the quantity, every other type subtracts it. The validator
/// has already refused oversized decreases, so an underflow here is reported
/// as an invariant violation rather than clamped.
pub fn apply(product: &Product, movement: &ValidatedMovement) -> DomainResult<Product> {
    if product.id_typed() != movement.product_id() {
        return Err(DomainError::invariant(format!(
            "movement for {} applied to {}",
            movement.product_id(),
            product.id_typed()
        )));
    }

    let stock = product.current_stock();
    let qty = movement.quantity().get();
    let next = if movement.details().movement_type.decreases_stock() {
        stock.checked_sub(qty)
    } else {
        stock.checked_add(qty)
    };

    let next = next.ok_or_else(|| {
        DomainError::invariant(format!(
            "stock out of range for {}: {} {} {}",
            product.id_typed(),
            stock,
            movement.details().movement_type,
            qty
        ))
    })?;

    Ok(product.with_stock(next))
}

/// Signed stock a product would have after a prospective movement.
///
/// Used for previews while a request is still being edited; performs no
/// validation and may return a negative number.
pub fn projected_stock(product: &Product, movement_type: MovementType, quantity: i64) -> i64 {
    let stock = i64::from(product.current_stock());
    if movement_type.decreases_stock() {
        stock.saturating_sub(quantity)
    } else {
        stock.saturating_add(quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::MovementRequest;
    use crate::validator::validate;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use stockflow_core::ProductId;

    fn product(stock: u32, min: u32) -> Product {
        Product::new(ProductId::from(1), "CAM-001", "Black Tee", Decimal::new(2990, 2), stock, min)
            .unwrap()
    }

    fn validated(p: &Product, ty: MovementType, qty: i64) -> ValidatedMovement {
        let req = MovementRequest::new(p.id_typed().clone(), ty, qty, "Adjustment", "Ana");
        validate(std::slice::from_ref(p), &req).unwrap()
    }

    #[test]
    fn receipt_of_five_on_ten_gives_fifteen() {
        let p = product(10, 5);
        let updated = apply(&p, &validated(&p, MovementType::Receipt, 5)).unwrap();
        assert_eq!(updated.current_stock(), 15);
        assert_eq!(updated.minimum_stock(), 5);
        assert_eq!(updated.name(), p.name());
    }

    #[test]
    fn movement_for_other_product_is_an_invariant_violation() {
        let p = product(10, 5);
        let m = validated(&p, MovementType::Receipt, 1);
        let other =
            Product::new(ProductId::from(2), "X", "X", Decimal::ONE, 10, 0).unwrap();
        assert!(matches!(apply(&other, &m), Err(DomainError::InvariantViolation(_))));
    }

    #[test]
    fn underflow_is_reported_not_clamped() {
        let p = product(10, 0);
        let m = validated(&p, MovementType::Issue, 8);
        let drained = product(3, 0);
        assert!(matches!(apply(&drained, &m), Err(DomainError::InvariantViolation(_))));
    }

    #[test]
    fn preview_can_go_negative() {
        let p = product(2, 0);
        assert_eq!(projected_stock(&p, MovementType::Issue, 5), -3);
        assert_eq!(projected_stock(&p, MovementType::Receipt, 5), 7);
    }

    fn decreasing_type() -> impl Strategy<Value = MovementType> {
        prop_oneof![
            Just(MovementType::Issue),
            Just(MovementType::Defect),
            Just(MovementType::Transfer),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a receipt adds exactly its quantity.
        #[test]
        fn receipt_adds_quantity(stock in 0u32..1_000_000, qty in 1i64..1_000_000) {
            let p = product(stock, 0);
            let updated = apply(&p, &validated(&p, MovementType::Receipt, qty)).unwrap();
            prop_assert_eq!(i64::from(updated.current_stock()), i64::from(stock) + qty);
        }

        /// Property: an in-range decrease subtracts exactly its quantity.
        #[test]
        fn decrease_subtracts_quantity(
            (stock, qty) in (1u32..1_000_000).prop_flat_map(|s| (Just(s), 1u32..=s)),
            ty in decreasing_type(),
        ) {
            let p = product(stock, 0);
            let updated = apply(&p, &validated(&p, ty, i64::from(qty))).unwrap();
            prop_assert_eq!(updated.current_stock(), stock - qty);
        }

        /// Property: decreases larger than the stock are refused and leave the product as is.
        #[test]
        fn oversized_decrease_is_refused(
            stock in 0u32..10_000,
            extra in 1u32..10_000,
            ty in decreasing_type(),
        ) {
            let p = product(stock, 0);
            let before = p.clone();
            let req = MovementRequest::new(
                p.id_typed().clone(), ty, i64::from(stock + extra), "Sale", "Ana",
            );
            let is_insufficient = matches!(
                validate(std::slice::from_ref(&p), &req),
                Err(crate::validator::ValidationError::InsufficientStock { .. })
            );
            prop_assert!(is_insufficient);
            prop_assert_eq!(p, before);
        }
    }
}
