pub mod common;
pub mod health;
pub mod invoices;
pub mod shipments;

use crate::db::DbPool;
use crate::services::{InvoiceService, ShipmentService};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Debug, Clone)]
pub struct AppServices {
    pub invoices: Arc<InvoiceService>,
    pub shipments: Arc<ShipmentService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            invoices: Arc::new(InvoiceService::new(db_pool.clone())),
            shipments: Arc::new(ShipmentService::new(db_pool)),
        }
    }
}
