use async_trait::async_trait;
use sea_orm::{ActiveValue::NotSet, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryResult};
use std::sync::Arc;

use super::row_mapper::{ProductOrderRowMapper, RowMapper};
use super::{BaseRepository, EntityRepository};
use crate::db::EntityTable;
use crate::entities::product_order;
use crate::errors::ServiceError;
use crate::models::ProductOrder;

/// Orders have no REST surface of their own; invoices reference them.
#[derive(Debug, Clone)]
pub struct ProductOrderRepository {
    base: BaseRepository,
}

impl ProductOrderRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl EntityRepository for ProductOrderRepository {
    type Entity = ProductOrder;

    const ENTITY_NAME: &'static str = "productOrder";
    const TABLE: EntityTable = product_order::TABLE;

    fn base(&self) -> &BaseRepository {
        &self.base
    }

    fn map_row(row: &QueryResult) -> Result<ProductOrder, DbErr> {
        ProductOrderRowMapper.apply(row, product_order::TABLE.prefix)
    }

    fn id_of(entity: &ProductOrder) -> Option<i64> {
        entity.id
    }

    async fn insert(&self, mut entity: ProductOrder) -> Result<ProductOrder, ServiceError> {
        let model = entity.to_active_model()?;
        let result = self
            .base
            .access()
            .execute("product_order.insert", |db| {
                product_order::Entity::insert(model).exec(db)
            })
            .await?;
        entity.id = Some(result.last_insert_id);
        Ok(entity)
    }

    async fn update(&self, entity: &ProductOrder) -> Result<u64, ServiceError> {
        let id = entity
            .id
            .ok_or_else(|| ServiceError::bad_request_alert("Invalid id", Self::ENTITY_NAME, "idnull"))?;
        let mut model = entity.to_active_model()?;
        model.id = NotSet;

        let result = self
            .base
            .access()
            .execute("product_order.update", |db| {
                product_order::Entity::update_many()
                    .set(model)
                    .filter(product_order::Column::Id.eq(id))
                    .exec(db)
            })
            .await?;
        Ok(result.rows_affected)
    }

    async fn delete_by_id(&self, id: i64) -> Result<u64, ServiceError> {
        let result = self
            .base
            .access()
            .execute("product_order.delete", |db| {
                product_order::Entity::delete_by_id(id).exec(db)
            })
            .await?;
        Ok(result.rows_affected)
    }
}
