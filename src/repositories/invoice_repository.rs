use async_trait::async_trait;
use futures::stream::BoxStream;
use sea_orm::{ActiveValue::NotSet, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryResult};
use std::sync::Arc;

use super::row_mapper::{InvoiceRowMapper, ProductOrderRowMapper, RowMapper};
use super::{BaseRepository, EntityRepository};
use crate::db::{Criteria, EntityTable, JoinSpec};
use crate::entities::invoice;
use crate::errors::ServiceError;
use crate::models::Invoice;

/// Repository for invoices, each read together with its order
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    base: BaseRepository,
}

impl InvoiceRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub fn find_by_order(&self, order_id: i64) -> BoxStream<'_, Result<Invoice, ServiceError>> {
        self.find_all_by_criteria(None, Some(&Criteria::equals("orderId", order_id)))
    }

    pub fn find_all_where_order_is_null(&self) -> BoxStream<'_, Result<Invoice, ServiceError>> {
        self.find_all_by_criteria(None, Some(&Criteria::is_null("orderId")))
    }
}

#[async_trait]
impl EntityRepository for InvoiceRepository {
    type Entity = Invoice;

    const ENTITY_NAME: &'static str = "invoice";
    const TABLE: EntityTable = invoice::TABLE;
    const JOIN: Option<JoinSpec> = Some(invoice::ORDER_JOIN);

    fn base(&self) -> &BaseRepository {
        &self.base
    }

    fn map_row(row: &QueryResult) -> Result<Invoice, DbErr> {
        let mut entity = InvoiceRowMapper.apply(row, invoice::TABLE.prefix)?;
        if let Some(order) = ProductOrderRowMapper.apply_optional(row, invoice::ORDER_JOIN.target.prefix)? {
            entity.set_order(Some(order));
        }
        Ok(entity)
    }

    fn id_of(entity: &Invoice) -> Option<i64> {
        entity.id
    }

    async fn insert(&self, mut entity: Invoice) -> Result<Invoice, ServiceError> {
        let model = entity.to_active_model()?;
        let result = self
            .base
            .access()
            .execute("invoice.insert", |db| invoice::Entity::insert(model).exec(db))
            .await?;
        entity.id = Some(result.last_insert_id);
        Ok(entity)
    }

    async fn update(&self, entity: &Invoice) -> Result<u64, ServiceError> {
        let id = entity
            .id
            .ok_or_else(|| ServiceError::bad_request_alert("Invalid id", Self::ENTITY_NAME, "idnull"))?;
        let mut model = entity.to_active_model()?;
        model.id = NotSet;

        let result = self
            .base
            .access()
            .execute("invoice.update", |db| {
                invoice::Entity::update_many()
                    .set(model)
                    .filter(invoice::Column::Id.eq(id))
                    .exec(db)
            })
            .await?;
        Ok(result.rows_affected)
    }

    async fn delete_by_id(&self, id: i64) -> Result<u64, ServiceError> {
        let result = self
            .base
            .access()
            .execute("invoice.delete", |db| invoice::Entity::delete_by_id(id).exec(db))
            .await?;
        Ok(result.rows_affected)
    }
}
