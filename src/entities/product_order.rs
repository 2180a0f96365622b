use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::VariantNames;
use utoipa::ToSchema;

use crate::db::{ColumnDescriptor, ColumnKind, EntityTable};

/// Lifecycle state of a product order
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    EnumIter,
    DeriveActiveEnum,
    strum::EnumString,
    strum::VariantNames,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "product_order")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub placed_date: DateTimeUtc,
    pub status: OrderStatus,
    pub code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::invoice::Entity")]
    Invoices,
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const COLUMNS: &[ColumnDescriptor] = &[
    ColumnDescriptor::new("id", "id", ColumnKind::BigInt),
    ColumnDescriptor::new("placedDate", "placed_date", ColumnKind::Timestamp),
    ColumnDescriptor::new("status", "status", ColumnKind::Enum(OrderStatus::VARIANTS)),
    ColumnDescriptor::new("code", "code", ColumnKind::Text),
];

/// `product_order` read on its own
pub const TABLE: EntityTable = EntityTable {
    table: "product_order",
    alias: "e",
    prefix: "e",
    columns: COLUMNS,
};
