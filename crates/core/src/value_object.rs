//! Value object trait: equality by value, not identity.
//!
//! Value objects have no identity; two instances with the same attribute
//! values are interchangeable. In this workspace quantities and money amounts
//! are value objects, products and movements are entities.

/// Marker trait for value objects.
///
/// Value objects are immutable: to "modify" one, build a new value.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
