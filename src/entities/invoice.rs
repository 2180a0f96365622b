use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::VariantNames;
use utoipa::ToSchema;

use crate::db::{ColumnDescriptor, ColumnKind, EntityTable, JoinSpec};

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
pub enum InvoiceStatus {
    #[sea_orm(string_value = "PAID")]
    Paid,
    #[sea_orm(string_value = "ISSUED")]
    Issued,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

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
pub enum PaymentMethod {
    #[sea_orm(string_value = "CREDIT_CARD")]
    CreditCard,
    #[sea_orm(string_value = "CASH_ON_DELIVERY")]
    CashOnDelivery,
    #[sea_orm(string_value = "PAYPAL")]
    Paypal,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "invoice")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub date: DateTimeUtc,
    pub details: Option<String>,
    pub status: InvoiceStatus,
    pub payment_method: PaymentMethod,
    pub payment_date: DateTimeUtc,
    #[sea_orm(column_type = "Decimal(Some((21, 2)))")]
    pub payment_amount: Decimal,
    pub order_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product_order::Entity",
        from = "Column::OrderId",
        to = "super::product_order::Column::Id"
    )]
    ProductOrder,
    #[sea_orm(has_many = "super::shipment::Entity")]
    Shipments,
}

impl Related<super::product_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductOrder.def()
    }
}

impl Related<super::shipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shipments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const COLUMNS: &[ColumnDescriptor] = &[
    ColumnDescriptor::new("id", "id", ColumnKind::BigInt),
    ColumnDescriptor::new("date", "date", ColumnKind::Timestamp),
    ColumnDescriptor::new("details", "details", ColumnKind::Text),
    ColumnDescriptor::new("status", "status", ColumnKind::Enum(InvoiceStatus::VARIANTS)),
    ColumnDescriptor::new(
        "paymentMethod",
        "payment_method",
        ColumnKind::Enum(PaymentMethod::VARIANTS),
    ),
    ColumnDescriptor::new("paymentDate", "payment_date", ColumnKind::Timestamp),
    ColumnDescriptor::new("paymentAmount", "payment_amount", ColumnKind::Decimal),
    ColumnDescriptor::new("orderId", "order_id", ColumnKind::BigInt),
];

pub const TABLE: EntityTable = EntityTable {
    table: "invoice",
    alias: "e",
    prefix: "e",
    columns: COLUMNS,
};

/// Invoice rows carry their order under the `order_` prefix
pub const ORDER_JOIN: JoinSpec = JoinSpec {
    target: EntityTable {
        table: "product_order",
        alias: "e_order",
        prefix: "order",
        columns: super::product_order::COLUMNS,
    },
    foreign_key: "order_id",
};
