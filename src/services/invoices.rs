use futures::TryStreamExt;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::db::{Criteria, DbPool, Page, Pageable};
use crate::errors::ServiceError;
use crate::models::{Invoice, Shipment};
use crate::repositories::{EntityRepository, InvoiceRepository, ShipmentRepository};

/// Service for managing invoices
#[derive(Debug, Clone)]
pub struct InvoiceService {
    repository: Arc<InvoiceRepository>,
    shipments: Arc<ShipmentRepository>,
}

impl InvoiceService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            repository: Arc::new(InvoiceRepository::new(db_pool.clone())),
            shipments: Arc::new(ShipmentRepository::new(db_pool)),
        }
    }

    pub fn repository(&self) -> &InvoiceRepository {
        &self.repository
    }

    /// Creates or updates an invoice depending on whether it has an id
    #[instrument(skip(self))]
    pub async fn save(&self, invoice: Invoice) -> Result<Invoice, ServiceError> {
        debug!("Request to save Invoice");
        self.repository.save(invoice).await
    }

    #[instrument(skip(self))]
    pub async fn update(&self, invoice: Invoice) -> Result<Invoice, ServiceError> {
        debug!("Request to update Invoice");
        self.repository.save(invoice).await
    }

    /// Copies the fields present in `patch` onto the stored invoice.
    /// Returns `None` when no invoice has the patch's id.
    #[instrument(skip(self))]
    pub async fn partial_update(&self, patch: Invoice) -> Result<Option<Invoice>, ServiceError> {
        debug!("Request to partially update Invoice");
        let Some(id) = patch.id else {
            return Err(ServiceError::bad_request_alert(
                "Invalid id",
                InvoiceRepository::ENTITY_NAME,
                "idnull",
            ));
        };

        match self.repository.find_by_id(id).await? {
            Some(mut existing) => {
                existing.merge_from(&patch);
                self.repository.save(existing).await.map(Some)
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn find_all(&self, pageable: &Pageable) -> Result<Page<Invoice>, ServiceError> {
        debug!("Request to get all Invoices");
        super::load_page(&*self.repository, pageable, None).await
    }

    #[instrument(skip(self))]
    pub async fn find_all_by_criteria(
        &self,
        pageable: &Pageable,
        criteria: Option<&Criteria>,
    ) -> Result<Page<Invoice>, ServiceError> {
        debug!("Request to get Invoices by criteria");
        super::load_page(&*self.repository, pageable, criteria).await
    }

    #[instrument(skip(self))]
    pub async fn count_all(&self) -> Result<u64, ServiceError> {
        debug!("Request to count all Invoices");
        self.repository.count_all().await
    }

    #[instrument(skip(self))]
    pub async fn count_by(&self, criteria: Option<&Criteria>) -> Result<u64, ServiceError> {
        debug!("Request to count Invoices by criteria");
        self.repository.count_by(criteria).await
    }

    #[instrument(skip(self))]
    pub async fn find_one(&self, id: i64) -> Result<Option<Invoice>, ServiceError> {
        debug!("Request to get Invoice : {}", id);
        self.repository.find_by_id(id).await
    }

    #[instrument(skip(self))]
    pub async fn exists(&self, id: i64) -> Result<bool, ServiceError> {
        self.repository.exists_by_id(id).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        debug!("Request to delete Invoice : {}", id);
        self.repository.delete_by_id(id).await?;
        Ok(())
    }

    /// Shipments pointing at the invoice
    #[instrument(skip(self))]
    pub async fn shipments(&self, id: i64) -> Result<Vec<Shipment>, ServiceError> {
        debug!("Request to get Shipments of Invoice : {}", id);
        if !self.repository.exists_by_id(id).await? {
            return Err(ServiceError::NotFound(format!("Invoice {id} not found")));
        }
        self.shipments.find_by_invoice(id).try_collect().await
    }
}
