pub mod invoice;
pub mod product_order;
pub mod shipment;

pub use invoice::{InvoiceStatus, PaymentMethod};
pub use product_order::OrderStatus;
