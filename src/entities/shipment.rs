use sea_orm::entity::prelude::*;

use crate::db::{ColumnDescriptor, ColumnKind, EntityTable, JoinSpec};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "shipment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub tracking_code: Option<String>,
    pub date: DateTimeUtc,
    pub details: Option<String>,
    pub invoice_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::invoice::Entity",
        from = "Column::InvoiceId",
        to = "super::invoice::Column::Id"
    )]
    Invoice,
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const COLUMNS: &[ColumnDescriptor] = &[
    ColumnDescriptor::new("id", "id", ColumnKind::BigInt),
    ColumnDescriptor::new("trackingCode", "tracking_code", ColumnKind::Text),
    ColumnDescriptor::new("date", "date", ColumnKind::Timestamp),
    ColumnDescriptor::new("details", "details", ColumnKind::Text),
    ColumnDescriptor::new("invoiceId", "invoice_id", ColumnKind::BigInt),
];

pub const TABLE: EntityTable = EntityTable {
    table: "shipment",
    alias: "e",
    prefix: "e",
    columns: COLUMNS,
};

/// Shipment rows carry their invoice under the `invoice_` prefix
pub const INVOICE_JOIN: JoinSpec = JoinSpec {
    target: EntityTable {
        table: "invoice",
        alias: "invoice",
        prefix: "invoice",
        columns: super::invoice::COLUMNS,
    },
    foreign_key: "invoice_id",
};
