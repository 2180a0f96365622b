//! Domain records exchanged between the REST layer, services and repositories.
//!
//! Identity is the primary key: two records are equal only when both carry
//! the same id. Compare field by field when content matters.

pub mod invoice;
pub mod product_order;
pub mod shipment;

pub use crate::entities::{InvoiceStatus, OrderStatus, PaymentMethod};
pub use invoice::Invoice;
pub use product_order::ProductOrder;
pub use shipment::Shipment;

use crate::errors::ServiceError;

/// Unwraps a field the storage layer cannot do without.
pub(crate) fn required<T: Clone>(
    value: &Option<T>,
    entity: &str,
    field: &str,
) -> Result<T, ServiceError> {
    value
        .clone()
        .ok_or_else(|| ServiceError::ValidationError(format!("{entity}.{field} is required")))
}
