//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined entirely
//! by their attribute values. Two value objects with the same values are considered equal.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. An order line
/// `{ order_id: "order1", sku: "RED-CHAIR", quantity: 12 }` is a value object:
/// any two lines with those three fields are interchangeable. A batch, by
/// contrast, is an entity: it keeps its identity while its allocations change.
///
/// The trait requires:
/// - **Clone**: values are copied rather than shared
/// - **Eq + Hash**: values can live in sets keyed by their full contents
/// - **Debug**: values show up in logs and test failures
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// struct Reservation {
///     sku: Sku,
///     quantity: i64,
/// }
///
/// impl ValueObject for Reservation {}
/// ```
pub trait ValueObject: Clone + Eq + core::hash::Hash + core::fmt::Debug {}
