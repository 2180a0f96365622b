use std::sync::Arc;
use tracing::{debug, instrument};

use crate::db::{Criteria, DbPool, Page, Pageable};
use crate::errors::ServiceError;
use crate::models::Shipment;
use crate::repositories::{EntityRepository, ShipmentRepository};

/// Service for managing shipments
#[derive(Debug, Clone)]
pub struct ShipmentService {
    repository: Arc<ShipmentRepository>,
}

impl ShipmentService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            repository: Arc::new(ShipmentRepository::new(db_pool)),
        }
    }

    pub fn repository(&self) -> &ShipmentRepository {
        &self.repository
    }

    /// Creates or updates a shipment depending on whether it has an id
    #[instrument(skip(self))]
    pub async fn save(&self, shipment: Shipment) -> Result<Shipment, ServiceError> {
        debug!("Request to save Shipment");
        self.repository.save(shipment).await
    }

    #[instrument(skip(self))]
    pub async fn update(&self, shipment: Shipment) -> Result<Shipment, ServiceError> {
        debug!("Request to update Shipment");
        self.repository.save(shipment).await
    }

    /// Copies the fields present in `patch` onto the stored shipment.
    /// Returns `None` when no shipment has the patch's id.
    #[instrument(skip(self))]
    pub async fn partial_update(&self, patch: Shipment) -> Result<Option<Shipment>, ServiceError> {
        debug!("Request to partially update Shipment");
        let Some(id) = patch.id else {
            return Err(ServiceError::bad_request_alert(
                "Invalid id",
                ShipmentRepository::ENTITY_NAME,
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
    pub async fn find_all(&self, pageable: &Pageable) -> Result<Page<Shipment>, ServiceError> {
        debug!("Request to get all Shipments");
        super::load_page(&*self.repository, pageable, None).await
    }

    #[instrument(skip(self))]
    pub async fn find_all_by_criteria(
        &self,
        pageable: &Pageable,
        criteria: Option<&Criteria>,
    ) -> Result<Page<Shipment>, ServiceError> {
        debug!("Request to get Shipments by criteria");
        super::load_page(&*self.repository, pageable, criteria).await
    }

    #[instrument(skip(self))]
    pub async fn count_all(&self) -> Result<u64, ServiceError> {
        debug!("Request to count all Shipments");
        self.repository.count_all().await
    }

    #[instrument(skip(self))]
    pub async fn count_by(&self, criteria: Option<&Criteria>) -> Result<u64, ServiceError> {
        debug!("Request to count Shipments by criteria");
        self.repository.count_by(criteria).await
    }

    #[instrument(skip(self))]
    pub async fn find_one(&self, id: i64) -> Result<Option<Shipment>, ServiceError> {
        debug!("Request to get Shipment : {}", id);
        self.repository.find_by_id(id).await
    }

    #[instrument(skip(self))]
    pub async fn exists(&self, id: i64) -> Result<bool, ServiceError> {
        self.repository.exists_by_id(id).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        debug!("Request to delete Shipment : {}", id);
        self.repository.delete_by_id(id).await?;
        Ok(())
    }
}
