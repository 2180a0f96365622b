use async_trait::async_trait;
use futures::future;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use metrics::counter;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, QueryResult};
use std::sync::Arc;
use tracing::{error, warn};

use crate::db::query_builder::{fetch, fetch_count};
use crate::db::{Criteria, DatabaseAccess, EntityTable, JoinSpec, Pageable, QueryBuilder};
use crate::errors::ServiceError;

pub mod invoice_repository;
pub mod product_order_repository;
pub mod row_mapper;
pub mod shipment_repository;

pub use invoice_repository::InvoiceRepository;
pub use product_order_repository::ProductOrderRepository;
pub use row_mapper::{InvoiceRowMapper, ProductOrderRowMapper, RowMapper, ShipmentRowMapper};
pub use shipment_repository::ShipmentRepository;

/// Shared plumbing for every repository: the connection plus the
/// instrumented access wrapper.
#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Arc<DatabaseConnection>,
    access: DatabaseAccess,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            access: DatabaseAccess::new(db.clone()),
            db,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn access(&self) -> &DatabaseAccess {
        &self.access
    }

    /// Lazily runs `query`, mapping each row with `map`. A query that cannot
    /// be built yields a single error item.
    pub fn stream<'a, T, F>(
        &'a self,
        operation: &'static str,
        query: &QueryBuilder,
        map: F,
    ) -> BoxStream<'a, Result<T, ServiceError>>
    where
        T: Send + 'a,
        F: Fn(&QueryResult) -> Result<T, DbErr> + Send + 'a,
    {
        let stmt = match query.statement(self.db.get_database_backend()) {
            Ok(stmt) => stmt,
            Err(e) => return stream::once(future::ready(Err(e.into()))).boxed(),
        };

        fetch(self.db(), stmt, map)
            .map_err(move |e| {
                error!(operation = %operation, error = %e, "Database query failed");
                counter!("store_db.operation.error", 1, "operation" => operation);
                ServiceError::DatabaseError(e)
            })
            .boxed()
    }

    pub async fn count(&self, operation: &str, query: &QueryBuilder) -> Result<u64, ServiceError> {
        let stmt = query.count_statement(self.db.get_database_backend());
        self.access
            .execute(operation, |db| fetch_count(db, stmt))
            .await
    }
}

/// Reads and writes for one entity type. Reads are assembled through
/// [`QueryBuilder`] over [`Self::TABLE`] (plus [`Self::JOIN`] when the
/// entity carries an association); writes go through sea-orm active models.
#[async_trait]
pub trait EntityRepository: Send + Sync {
    type Entity: Send + Sync + 'static;

    /// Name used in conflict errors and alert headers
    const ENTITY_NAME: &'static str;
    const TABLE: EntityTable;
    const JOIN: Option<JoinSpec> = None;

    fn base(&self) -> &BaseRepository;

    /// Maps one row of [`EntityRepository::query`], association included
    fn map_row(row: &QueryResult) -> Result<Self::Entity, DbErr>;

    fn id_of(entity: &Self::Entity) -> Option<i64>;

    /// Inserts a record that has no id yet and returns it with the
    /// generated id.
    async fn insert(&self, entity: Self::Entity) -> Result<Self::Entity, ServiceError>;

    /// Rewrites the row with the entity's id. Returns the number of rows
    /// touched, which is zero when the row is gone.
    async fn update(&self, entity: &Self::Entity) -> Result<u64, ServiceError>;

    async fn delete_by_id(&self, id: i64) -> Result<u64, ServiceError>;

    fn query(&self) -> QueryBuilder {
        let builder = QueryBuilder::new(Self::TABLE);
        match Self::JOIN {
            Some(join) => builder.left_join(join),
            None => builder,
        }
    }

    fn find_all(&self) -> BoxStream<'_, Result<Self::Entity, ServiceError>> {
        self.base().stream("find_all", &self.query(), Self::map_row)
    }

    fn find_all_by(&self, pageable: &Pageable) -> BoxStream<'_, Result<Self::Entity, ServiceError>> {
        self.base()
            .stream("find_all_by", &self.query().page(Some(pageable)), Self::map_row)
    }

    fn find_all_by_criteria(
        &self,
        pageable: Option<&Pageable>,
        criteria: Option<&Criteria>,
    ) -> BoxStream<'_, Result<Self::Entity, ServiceError>> {
        match self.query().criteria(criteria) {
            Ok(query) => self
                .base()
                .stream("find_all_by_criteria", &query.page(pageable), Self::map_row),
            Err(e) => stream::once(future::ready(Err(e.into()))).boxed(),
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Self::Entity>, ServiceError> {
        let mut rows = self.find_all_by_criteria(None, Some(&Criteria::equals("id", id)));
        rows.try_next().await
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, ServiceError> {
        self.count_by(Some(&Criteria::equals("id", id)))
            .await
            .map(|count| count > 0)
    }

    async fn count_all(&self) -> Result<u64, ServiceError> {
        self.base().count("count_all", &self.query()).await
    }

    async fn count_by(&self, criteria: Option<&Criteria>) -> Result<u64, ServiceError> {
        let query = self.query().criteria(criteria)?;
        self.base().count("count_by", &query).await
    }

    /// Inserts records without an id and updates the rest. An update that
    /// touches no row means the record was removed underneath us.
    async fn save(&self, entity: Self::Entity) -> Result<Self::Entity, ServiceError> {
        let Some(id) = Self::id_of(&entity) else {
            return self.insert(entity).await;
        };

        if self.update(&entity).await? == 0 {
            warn!(entity = Self::ENTITY_NAME, id, "Update affected no rows");
            return Err(ServiceError::ConflictingUpdate {
                entity: Self::ENTITY_NAME.to_string(),
                id,
            });
        }
        Ok(entity)
    }
}

/// Collects a repository stream, stopping at the first error
pub async fn collect<T>(rows: BoxStream<'_, Result<T, ServiceError>>) -> Result<Vec<T>, ServiceError> {
    rows.try_collect().await
}
