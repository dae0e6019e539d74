//! Movement reasons offered to users, per direction.

use crate::movement::Direction;

/// Sentinel reason that must be accompanied by a free-text elaboration.
pub const OTHER_REASON: &str = "Other";

const INBOUND_REASONS: &[&str] = &[
    "Merchandise purchase",
    "Customer return",
    "Transfer between stores",
    "Inventory adjustment",
    "Damaged product repaired",
    OTHER_REASON,
];

const OUTBOUND_REASONS: &[&str] = &[
    "Sale",
    "Damaged product",
    "Transfer between stores",
    "Return to supplier",
    "Inventory adjustment",
    "Free sample",
    OTHER_REASON,
];

/// Suggested reasons for a direction; the sentinel is always last.
pub fn suggested_reasons(direction: Direction) -> &'static [&'static str] {
    match direction {
        Direction::Inbound => INBOUND_REASONS,
        Direction::Outbound => OUTBOUND_REASONS,
    }
}

/// Whether `reason` is the "other" sentinel (also accepts the legacy `Outros`).
pub fn is_other(reason: &str) -> bool {
    let reason = reason.trim();
    reason.eq_ignore_ascii_case(OTHER_REASON) || reason.eq_ignore_ascii_case("outros")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_ends_with_the_sentinel() {
        for dir in [Direction::Inbound, Direction::Outbound] {
            assert_eq!(suggested_reasons(dir).last(), Some(&OTHER_REASON));
        }
    }

    #[test]
    fn sentinel_matching_ignores_case_and_padding() {
        assert!(is_other(" other "));
        assert!(is_other("OUTROS"));
        assert!(!is_other("Sale"));
    }
}
