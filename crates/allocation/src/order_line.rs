use serde::{Deserialize, Serialize};

use stockflow_core::{DomainError, DomainResult, OrderId, Sku, ValueObject};

/// A customer's demand for some quantity of one SKU.
///
/// Immutable value object: equality and hashing cover all three fields, so
/// two lines with identical fields are interchangeable (and collapse into one
/// entry of a batch's allocation set).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawOrderLine")]
pub struct OrderLine {
    order_id: OrderId,
    sku: Sku,
    quantity: i64,
}

impl OrderLine {
    /// Create an order line. `quantity` must be strictly positive.
    pub fn new(order_id: OrderId, sku: Sku, quantity: i64) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation(format!(
                "order line quantity must be positive (got {quantity})"
            )));
        }
        Ok(Self {
            order_id,
            sku,
            quantity,
        })
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }
}

impl ValueObject for OrderLine {}

#[derive(Deserialize)]
struct RawOrderLine {
    order_id: OrderId,
    sku: Sku,
    quantity: i64,
}

impl TryFrom<RawOrderLine> for OrderLine {
    type Error = DomainError;

    fn try_from(raw: RawOrderLine) -> Result<Self, Self::Error> {
        OrderLine::new(raw.order_id, raw.sku, raw.quantity)
    }
}
