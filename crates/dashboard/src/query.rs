//! Read-side helpers for movement history and product lists.

use stockflow_core::Entity;
use stockflow_inventory::{Movement, Product};

/// Newest movements first, at most `limit` of them. Equal timestamps fall back
/// to descending id.
pub fn recent_movements(movements: &[Movement], limit: usize) -> Vec<&Movement> {
    let mut sorted: Vec<&Movement> = movements.iter().collect();
    sorted.sort_by(|a, b| {
        b.timestamp()
            .cmp(&a.timestamp())
            .then_with(|| b.id().cmp(a.id()))
    });
    sorted.truncate(limit);
    sorted
}

/// Movements whose product name or SKU contains `term`, ignoring case.
/// A blank term matches everything.
pub fn search_movements<'a>(movements: &'a [Movement], term: &str) -> Vec<&'a Movement> {
    let needle = term.trim().to_lowercase();
    movements
        .iter()
        .filter(|m| matches_name_or_sku(&needle, &m.product().name, &m.product().sku))
        .collect()
}

/// Products whose name or SKU contains `term`, ignoring case.
pub fn search_products<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    let needle = term.trim().to_lowercase();
    products
        .iter()
        .filter(|p| matches_name_or_sku(&needle, p.name(), p.sku()))
        .collect()
}

fn matches_name_or_sku(needle: &str, name: &str, sku: &str) -> bool {
    needle.is_empty()
        || name.to_lowercase().contains(needle)
        || sku.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use stockflow_core::{MovementId, ProductId};
    use stockflow_inventory::{MovementDetails, MovementType, ProductRef, Quantity};

    fn movement(id: u64, name: &str, sku: &str, minutes_ago: i64) -> Movement {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Movement::new(
            MovementId::from(id),
            ProductRef {
                id: ProductId::from(id),
                sku: sku.to_string(),
                name: name.to_string(),
            },
            MovementDetails {
                movement_type: MovementType::Issue,
                quantity: Quantity::new(1).unwrap(),
                reason: "Sale".to_string(),
                responsible_user: "Rui".to_string(),
                notes: None,
            },
            base - Duration::minutes(minutes_ago),
        )
    }

    #[test]
    fn recent_movements_are_newest_first_and_limited() {
        let movements = [
            movement(1, "Tee", "CAM-001", 30),
            movement(2, "Jeans", "CAL-002", 120),
            movement(3, "Sneakers", "TEN-003", 5),
            movement(4, "Cap", "BON-004", 5),
        ];
        let ids: Vec<String> = recent_movements(&movements, 3)
            .iter()
            .map(|m| m.id().to_string())
            .collect();
        assert_eq!(ids, ["4", "3", "1"]);
    }

    #[test]
    fn search_matches_name_or_sku_case_insensitively() {
        let movements = [movement(1, "Black Tee", "CAM-001", 0), movement(2, "Jeans", "CAL-002", 0)];
        assert_eq!(search_movements(&movements, "tee").len(), 1);
        assert_eq!(search_movements(&movements, "cal-").len(), 1);
        assert_eq!(search_movements(&movements, "  ").len(), 2);
        assert!(search_movements(&movements, "boots").is_empty());
    }

    #[test]
    fn product_search_uses_the_same_rule() {
        let products = [
            Product::new(ProductId::from(1), "TEN-003", "White Sneakers", Decimal::ONE, 1, 0).unwrap(),
        ];
        assert_eq!(search_products(&products, "sneak").len(), 1);
        assert_eq!(search_products(&products, "ten-").len(), 1);
        assert!(search_products(&products, "tee").is_empty());
    }
}
