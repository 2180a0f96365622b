use async_trait::async_trait;
use futures::stream::BoxStream;
use sea_orm::{ActiveValue::NotSet, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryResult};
use std::sync::Arc;

use super::row_mapper::{InvoiceRowMapper, RowMapper, ShipmentRowMapper};
use super::{BaseRepository, EntityRepository};
use crate::db::{Criteria, EntityTable, JoinSpec};
use crate::entities::shipment;
use crate::errors::ServiceError;
use crate::models::Shipment;

/// Repository for shipments, each read together with its invoice
#[derive(Debug, Clone)]
pub struct ShipmentRepository {
    base: BaseRepository,
}

impl ShipmentRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub fn find_by_invoice(&self, invoice_id: i64) -> BoxStream<'_, Result<Shipment, ServiceError>> {
        self.find_all_by_criteria(None, Some(&Criteria::equals("invoiceId", invoice_id)))
    }

    pub fn find_all_where_invoice_is_null(&self) -> BoxStream<'_, Result<Shipment, ServiceError>> {
        self.find_all_by_criteria(None, Some(&Criteria::is_null("invoiceId")))
    }
}

#[async_trait]
impl EntityRepository for ShipmentRepository {
    type Entity = Shipment;

    const ENTITY_NAME: &'static str = "shipment";
    const TABLE: EntityTable = shipment::TABLE;
    const JOIN: Option<JoinSpec> = Some(shipment::INVOICE_JOIN);

    fn base(&self) -> &BaseRepository {
        &self.base
    }

    fn map_row(row: &QueryResult) -> Result<Shipment, DbErr> {
        let mut entity = ShipmentRowMapper.apply(row, shipment::TABLE.prefix)?;
        if let Some(invoice) =
            InvoiceRowMapper.apply_optional(row, shipment::INVOICE_JOIN.target.prefix)?
        {
            entity.set_invoice(Some(invoice));
        }
        Ok(entity)
    }

    fn id_of(entity: &Shipment) -> Option<i64> {
        entity.id
    }

    async fn insert(&self, mut entity: Shipment) -> Result<Shipment, ServiceError> {
        let model = entity.to_active_model()?;
        let result = self
            .base
            .access()
            .execute("shipment.insert", |db| shipment::Entity::insert(model).exec(db))
            .await?;
        entity.id = Some(result.last_insert_id);
        Ok(entity)
    }

    async fn update(&self, entity: &Shipment) -> Result<u64, ServiceError> {
        let id = entity
            .id
            .ok_or_else(|| ServiceError::bad_request_alert("Invalid id", Self::ENTITY_NAME, "idnull"))?;
        let mut model = entity.to_active_model()?;
        model.id = NotSet;

        let result = self
            .base
            .access()
            .execute("shipment.update", |db| {
                shipment::Entity::update_many()
                    .set(model)
                    .filter(shipment::Column::Id.eq(id))
                    .exec(db)
            })
            .await?;
        Ok(result.rows_affected)
    }

    async fn delete_by_id(&self, id: i64) -> Result<u64, ServiceError> {
        let result = self
            .base
            .access()
            .execute("shipment.delete", |db| shipment::Entity::delete_by_id(id).exec(db))
            .await?;
        Ok(result.rows_affected)
    }
}
