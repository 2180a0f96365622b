use futures::future;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use sea_orm::sea_query::{
    Alias, Condition, Expr, Func, JoinType, Order, Query, SelectStatement,
};
use sea_orm::{ConnectionTrait, DbBackend, DbErr, QueryResult, Statement};

use super::column_converter::{resolve, ColumnDescriptor};
use super::criteria::{Criteria, CriteriaError, CriteriaTranslator};
use super::pagination::{Direction, Pageable};

const COUNT_ALIAS: &str = "total";

/// A table as it appears in a mapped SELECT: its SQL alias and the prefix
/// its columns are projected under (`<prefix>_<column>`).
#[derive(Debug, Clone, Copy)]
pub struct EntityTable {
    pub table: &'static str,
    pub alias: &'static str,
    pub prefix: &'static str,
    pub columns: &'static [ColumnDescriptor],
}

impl EntityTable {
    /// Alias a column of this table is projected under
    pub fn column_alias(&self, column: &str) -> String {
        format!("{}_{}", self.prefix, column)
    }

    fn project(&self, select: &mut SelectStatement) {
        for column in self.columns {
            select.expr_as(
                Expr::col((Alias::new(self.alias), Alias::new(column.column))),
                Alias::new(self.column_alias(column.column)),
            );
        }
    }
}

/// Left outer join from the root table's `foreign_key` to `target.id`
#[derive(Debug, Clone, Copy)]
pub struct JoinSpec {
    pub target: EntityTable,
    pub foreign_key: &'static str,
}

/// Assembles the SELECT behind every repository read: root columns, the
/// optional joined association, an optional filter and an optional page.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    root: EntityTable,
    join: Option<JoinSpec>,
    condition: Option<Condition>,
    pageable: Option<Pageable>,
}

impl QueryBuilder {
    pub fn new(root: EntityTable) -> Self {
        Self {
            root,
            join: None,
            condition: None,
            pageable: None,
        }
    }

    pub fn left_join(mut self, join: JoinSpec) -> Self {
        self.join = Some(join);
        self
    }

    /// Adds caller criteria, resolved against the root table's columns
    pub fn criteria(self, criteria: Option<&Criteria>) -> Result<Self, CriteriaError> {
        match criteria {
            None => Ok(self),
            Some(criteria) => {
                let condition =
                    CriteriaTranslator::new(self.root.alias, self.root.columns).translate(criteria)?;
                Ok(self.condition(condition))
            }
        }
    }

    /// Adds a pre-built condition, conjoined with any already present
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(match self.condition.take() {
            Some(existing) => Condition::all().add(existing).add(condition),
            None => condition,
        });
        self
    }

    pub fn page(mut self, pageable: Option<&Pageable>) -> Self {
        self.pageable = pageable.cloned();
        self
    }

    fn from_clause(&self) -> SelectStatement {
        let mut select = Query::select();
        select.from_as(Alias::new(self.root.table), Alias::new(self.root.alias));
        if let Some(join) = &self.join {
            select.join_as(
                JoinType::LeftJoin,
                Alias::new(join.target.table),
                Alias::new(join.target.alias),
                Expr::col((Alias::new(self.root.alias), Alias::new(join.foreign_key)))
                    .equals((Alias::new(join.target.alias), Alias::new("id"))),
            );
        }
        // no criteria, no WHERE
        if let Some(condition) = &self.condition {
            select.cond_where(condition.clone());
        }
        select
    }

    pub fn build_select(&self) -> Result<SelectStatement, CriteriaError> {
        let mut select = self.from_clause();
        self.root.project(&mut select);
        if let Some(join) = &self.join {
            join.target.project(&mut select);
        }

        if let Some(pageable) = &self.pageable {
            for order in &pageable.sort {
                let column = resolve(self.root.columns, &order.property)
                    .ok_or_else(|| CriteriaError::UnknownSortProperty(order.property.clone()))?;
                let direction = match order.direction {
                    Direction::Asc => Order::Asc,
                    Direction::Desc => Order::Desc,
                };
                select.order_by_expr(column.sql_expr(self.root.alias).into(), direction);
            }
            select.limit(pageable.size).offset(pageable.offset());
        }
        Ok(select)
    }

    pub fn build_count(&self) -> SelectStatement {
        let mut select = self.from_clause();
        select.expr_as(
            Func::count(Expr::col((Alias::new(self.root.alias), Alias::new("id")))),
            Alias::new(COUNT_ALIAS),
        );
        select
    }

    pub fn statement(&self, backend: DbBackend) -> Result<Statement, CriteriaError> {
        Ok(backend.build(&self.build_select()?))
    }

    pub fn count_statement(&self, backend: DbBackend) -> Statement {
        backend.build(&self.build_count())
    }
}

/// Runs `stmt` and maps each row. Nothing reaches the database until the
/// returned stream is first polled.
pub fn fetch<'a, C, T, F>(db: &'a C, stmt: Statement, map: F) -> BoxStream<'a, Result<T, DbErr>>
where
    C: ConnectionTrait,
    T: Send + 'a,
    F: Fn(&QueryResult) -> Result<T, DbErr> + Send + 'a,
{
    stream::once(async move { db.query_all(stmt).await })
        .map_ok(|rows| stream::iter(rows.into_iter().map(Ok::<_, DbErr>)))
        .try_flatten()
        .and_then(move |row| future::ready(map(&row)))
        .boxed()
}

/// Runs a statement produced by [`QueryBuilder::count_statement`]
pub async fn fetch_count<C>(db: &C, stmt: Statement) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let total = match db.query_one(stmt).await? {
        Some(row) => row.try_get_by::<i64, _>(COUNT_ALIAS)?,
        None => 0,
    };
    Ok(u64::try_from(total).unwrap_or_default())
}
