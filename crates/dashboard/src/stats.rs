//! Dashboard statistics, derived from scratch from the product and movement sets.

use chrono::{DateTime, TimeZone};
use rust_decimal::Decimal;
use serde::Serialize;

use stockflow_inventory::{Movement, Product, StockLevel};

/// Headline numbers shown on the dashboard.
///
/// Never patched incrementally: every refresh recomputes it with [`compute_stats`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_products: usize,
    pub low_stock_products: usize,
    pub out_of_stock_products: usize,
    pub total_movements_today: usize,
    pub total_inventory_value: Decimal,
}

/// Derive [`DashboardStats`].
///
/// `now` fixes both the reference instant and the viewer's time zone: a
/// movement counts as "today" when its timestamp falls on the same calendar
/// date as `now` in that zone.
pub fn compute_stats<Tz: TimeZone>(
    products: &[Product],
    movements: &[Movement],
    now: &DateTime<Tz>,
) -> DashboardStats {
    let mut stats = DashboardStats {
        total_products: products.len(),
        ..DashboardStats::default()
    };

    for product in products {
        match product.stock_level() {
            StockLevel::OutOfStock => stats.out_of_stock_products += 1,
            StockLevel::LowStock => stats.low_stock_products += 1,
            StockLevel::Healthy => {}
        }
        stats.total_inventory_value = stats
            .total_inventory_value
            .saturating_add(product.stock_value());
    }

    stats.total_movements_today = movements_on_day_of(movements, now);
    stats
}

/// Number of movements whose local calendar date equals that of `now`.
pub fn movements_on_day_of<Tz: TimeZone>(movements: &[Movement], now: &DateTime<Tz>) -> usize {
    let tz = now.timezone();
    let today = now.date_naive();
    movements
        .iter()
        .filter(|m| m.timestamp().with_timezone(&tz).date_naive() == today)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use proptest::prelude::*;
    use stockflow_core::{MovementId, ProductId};
    use stockflow_inventory::{MovementDetails, MovementType, ProductRef, Quantity};

    fn product(id: u64, stock: u32, min: u32, cents: i64) -> Product {
        Product::new(
            ProductId::from(id),
            format!("SKU-{id}"),
            format!("Product {id}"),
            Decimal::new(cents, 2),
            stock,
            min,
        )
        .unwrap()
    }

    fn movement_at(id: u64, rfc3339: &str) -> Movement {
        Movement::new(
            MovementId::from(id),
            ProductRef {
                id: ProductId::from(1),
                sku: "SKU-1".to_string(),
                name: "Product 1".to_string(),
            },
            MovementDetails {
                movement_type: MovementType::Receipt,
                quantity: Quantity::new(1).unwrap(),
                reason: "Purchase".to_string(),
                responsible_user: "Ana".to_string(),
                notes: None,
            },
            DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc),
        )
    }

    #[test]
    fn low_stock_product_is_counted_as_low_only() {
        let stats = compute_stats(&[product(1, 3, 5, 100)], &[], &Utc::now());
        assert_eq!(stats.low_stock_products, 1);
        assert_eq!(stats.out_of_stock_products, 0);
        assert_eq!(stats.total_products, 1);
    }

    #[test]
    fn empty_product_is_counted_as_out_of_stock_only() {
        let stats = compute_stats(&[product(1, 0, 5, 100)], &[], &Utc::now());
        assert_eq!(stats.low_stock_products, 0);
        assert_eq!(stats.out_of_stock_products, 1);
        assert_eq!(stats.total_inventory_value, Decimal::ZERO);
    }

    #[test]
    fn inventory_value_sums_price_times_stock() {
        let products = [product(1, 2, 0, 2990), product(2, 15, 0, 8990), product(3, 0, 0, 15990)];
        let stats = compute_stats(&products, &[], &Utc::now());
        assert_eq!(stats.total_inventory_value, Decimal::new(2990 * 2 + 8990 * 15, 2));
    }

    #[test]
    fn movements_today_use_the_viewers_calendar_day() {
        // 02:30 UTC on the 2nd is still the 1st in UTC-03:00.
        let movements = [
            movement_at(1, "2024-05-02T02:30:00Z"),
            movement_at(2, "2024-05-01T12:00:00Z"),
            movement_at(3, "2024-05-02T12:00:00Z"),
        ];
        let brt = FixedOffset::west_opt(3 * 3600).unwrap();
        let now = DateTime::parse_from_rfc3339("2024-05-01T20:00:00-03:00")
            .unwrap()
            .with_timezone(&brt);
        assert_eq!(compute_stats(&[], &movements, &now).total_movements_today, 2);

        let now_utc = DateTime::parse_from_rfc3339("2024-05-02T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(movements_on_day_of(&movements, &now_utc), 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: low and out-of-stock counts are disjoint and bounded by the total.
        #[test]
        fn alert_counts_are_disjoint(
            levels in prop::collection::vec((0u32..20, 0u32..20, 0i64..100_000), 0..40)
        ) {
            let products: Vec<Product> = levels
                .iter()
                .enumerate()
                .map(|(i, (stock, min, cents))| product(i as u64, *stock, *min, *cents))
                .collect();
            let stats = compute_stats(&products, &[], &Utc::now());
            prop_assert!(stats.low_stock_products + stats.out_of_stock_products <= stats.total_products);
            let zero = products.iter().filter(|p| p.current_stock() == 0).count();
            prop_assert_eq!(stats.out_of_stock_products, zero);
        }

        /// Property: recomputing from unchanged inputs gives identical stats.
        #[test]
        fn recomputation_is_idempotent(
            levels in prop::collection::vec((0u32..1_000, 0u32..50, 0i64..10_000_000), 0..40)
        ) {
            let products: Vec<Product> = levels
                .iter()
                .enumerate()
                .map(|(i, (stock, min, cents))| product(i as u64, *stock, *min, *cents))
                .collect();
            let now = Utc::now();
            let a = compute_stats(&products, &[], &now);
            let b = compute_stats(&products, &[], &now);
            prop_assert_eq!(a.total_inventory_value.serialize(), b.total_inventory_value.serialize());
            prop_assert_eq!(a, b);
        }
    }
}
