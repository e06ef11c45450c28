use core::cmp::Ordering;
use core::hash::{Hash, Hasher};
use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockflow_core::{BatchRef, DomainError, DomainResult, Entity, Sku};

use crate::order_line::OrderLine;

/// A discrete quantity of stock for one SKU.
///
/// Entity: identity is the `reference`. Two `Batch` values with the same
/// reference compare equal (and hash identically) even if their quantities,
/// etas or allocations differ.
///
/// `eta == None` means the stock is already in the warehouse; `Some(date)` is
/// an incoming shipment expected on that date.
///
/// The allocation set is private. It only changes through [`Batch::allocate`]
/// (which enforces [`Batch::can_allocate`]) and [`Batch::deallocate`], so
/// `available_quantity` can never be driven negative from outside.
#[derive(Debug, Clone)]
pub struct Batch {
    reference: BatchRef,
    sku: Sku,
    purchased_quantity: i64,
    eta: Option<NaiveDate>,
    allocations: HashSet<OrderLine>,
}

impl Batch {
    /// Create a batch with no allocations.
    pub fn new(
        reference: BatchRef,
        sku: Sku,
        purchased_quantity: i64,
        eta: Option<NaiveDate>,
    ) -> DomainResult<Self> {
        if purchased_quantity < 0 {
            return Err(DomainError::validation(format!(
                "purchased quantity cannot be negative (got {purchased_quantity})"
            )));
        }
        Ok(Self {
            reference,
            sku,
            purchased_quantity,
            eta,
            allocations: HashSet::new(),
        })
    }

    pub fn reference(&self) -> &BatchRef {
        &self.reference
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn purchased_quantity(&self) -> i64 {
        self.purchased_quantity
    }

    pub fn eta(&self) -> Option<NaiveDate> {
        self.eta
    }

    /// Order lines currently allocated against this batch (unordered).
    pub fn allocations(&self) -> impl Iterator<Item = &OrderLine> {
        self.allocations.iter()
    }

    pub fn is_allocated(&self, line: &OrderLine) -> bool {
        self.allocations.contains(line)
    }

    /// Sum of quantities over the current allocation set.
    pub fn allocated_quantity(&self) -> i64 {
        self.allocations.iter().map(OrderLine::quantity).sum()
    }

    pub fn available_quantity(&self) -> i64 {
        self.purchased_quantity - self.allocated_quantity()
    }

    /// True iff the line is for this batch's SKU and fits in what is left.
    pub fn can_allocate(&self, line: &OrderLine) -> bool {
        self.sku == *line.sku() && self.available_quantity() >= line.quantity()
    }

    /// Allocate `line` against this batch.
    ///
    /// Silently does nothing when [`Batch::can_allocate`] is false. Callers
    /// that need to know whether stock was found go through
    /// [`crate::allocate`], which reports `OutOfStock`. Allocating a line that
    /// is already present is also a no-op (set semantics).
    pub fn allocate(&mut self, line: &OrderLine) {
        if self.can_allocate(line) {
            self.allocations.insert(line.clone());
        } else {
            tracing::trace!(
                batch = %self.reference,
                order_id = %line.order_id(),
                sku = %line.sku(),
                quantity = line.quantity(),
                "batch cannot take order line; allocate ignored"
            );
        }
    }

    /// Remove `line` from the allocation set. No-op if it is not allocated here.
    pub fn deallocate(&mut self, line: &OrderLine) {
        self.allocations.remove(line);
    }

    /// The `>` half of the allocation ordering.
    ///
    /// A batch already in stock is never later than anything. A dated batch is
    /// later than one in stock, and later than another dated batch with an
    /// earlier eta. Batches with equal etas (or both in stock) are not later
    /// than each other in either direction, so this is a weak order that is
    /// only good for sorting.
    pub fn is_later_than(&self, other: &Batch) -> bool {
        match (self.eta, other.eta) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(mine), Some(theirs)) => mine > theirs,
        }
    }

    /// Serializable read view of the batch.
    pub fn snapshot(&self) -> BatchSnapshot {
        let mut allocations: Vec<OrderLine> = self.allocations.iter().cloned().collect();
        allocations.sort_by(|a, b| {
            (a.order_id(), a.sku(), a.quantity()).cmp(&(b.order_id(), b.sku(), b.quantity()))
        });
        BatchSnapshot {
            reference: self.reference.clone(),
            sku: self.sku.clone(),
            purchased_quantity: self.purchased_quantity,
            eta: self.eta,
            allocated_quantity: self.allocated_quantity(),
            available_quantity: self.available_quantity(),
            allocations,
        }
    }
}

impl PartialEq for Batch {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
    }
}

impl Eq for Batch {}

impl Hash for Batch {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.reference.hash(state);
    }
}

impl Entity for Batch {
    type Id = BatchRef;

    fn id(&self) -> &Self::Id {
        &self.reference
    }
}

/// Comparator used to rank candidate batches for allocation.
///
/// Stock in hand (`eta == None`) ranks first, then shipments by earliest eta.
/// Equal etas yield `Ordering::Equal`, so a stable sort keeps the caller's
/// order among them. Agrees with [`Batch::is_later_than`]. Deliberately not an
/// `Ord` impl on `Batch`: batches are compared by reference for equality, and
/// this relation says nothing about identity.
pub fn allocation_priority(a: &Batch, b: &Batch) -> Ordering {
    if a.is_later_than(b) {
        Ordering::Greater
    } else if b.is_later_than(a) {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

/// Point-in-time view of a batch for logs, APIs and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSnapshot {
    pub reference: BatchRef,
    pub sku: Sku,
    pub purchased_quantity: i64,
    pub eta: Option<NaiveDate>,
    pub allocated_quantity: i64,
    pub available_quantity: i64,
    /// Sorted by (order_id, sku, quantity) for stable output.
    pub allocations: Vec<OrderLine>,
}
