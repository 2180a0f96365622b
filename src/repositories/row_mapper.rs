//! Converters from a raw result row into domain records. Every column is
//! looked up as `<prefix>_<column>` so the same mapper serves both the root
//! table of a query and a joined one.

use sea_orm::{DbErr, QueryResult};

use crate::db::ColumnConverter;
use crate::models::{Invoice, ProductOrder, Shipment};

pub trait RowMapper: Send + Sync {
    type Entity;

    fn apply(&self, row: &QueryResult, prefix: &str) -> Result<Self::Entity, DbErr>;

    /// Like [`RowMapper::apply`], but a row whose `<prefix>_id` is NULL
    /// (a left join without a match) yields nothing.
    fn apply_optional(&self, row: &QueryResult, prefix: &str) -> Result<Option<Self::Entity>, DbErr> {
        match ColumnConverter::read::<i64>(row, &column(prefix, "id"))? {
            Some(_) => self.apply(row, prefix).map(Some),
            None => Ok(None),
        }
    }
}

fn column(prefix: &str, name: &str) -> String {
    format!("{prefix}_{name}")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProductOrderRowMapper;

impl RowMapper for ProductOrderRowMapper {
    type Entity = ProductOrder;

    fn apply(&self, row: &QueryResult, prefix: &str) -> Result<ProductOrder, DbErr> {
        Ok(ProductOrder {
            id: ColumnConverter::read(row, &column(prefix, "id"))?,
            placed_date: ColumnConverter::read(row, &column(prefix, "placed_date"))?,
            status: ColumnConverter::read_enum(row, &column(prefix, "status"))?,
            code: ColumnConverter::read(row, &column(prefix, "code"))?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceRowMapper;

impl RowMapper for InvoiceRowMapper {
    type Entity = Invoice;

    fn apply(&self, row: &QueryResult, prefix: &str) -> Result<Invoice, DbErr> {
        let mut invoice = Invoice::default();
        invoice.id = ColumnConverter::read(row, &column(prefix, "id"))?;
        invoice.date = ColumnConverter::read(row, &column(prefix, "date"))?;
        invoice.details = ColumnConverter::read(row, &column(prefix, "details"))?;
        invoice.status = ColumnConverter::read_enum(row, &column(prefix, "status"))?;
        invoice.payment_method = ColumnConverter::read_enum(row, &column(prefix, "payment_method"))?;
        invoice.payment_date = ColumnConverter::read(row, &column(prefix, "payment_date"))?;
        invoice.set_payment_amount(ColumnConverter::read_decimal(
            row,
            &column(prefix, "payment_amount"),
        )?);
        invoice.set_order_id(ColumnConverter::read(row, &column(prefix, "order_id"))?);
        Ok(invoice)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ShipmentRowMapper;

impl RowMapper for ShipmentRowMapper {
    type Entity = Shipment;

    fn apply(&self, row: &QueryResult, prefix: &str) -> Result<Shipment, DbErr> {
        let mut shipment = Shipment::default();
        shipment.id = ColumnConverter::read(row, &column(prefix, "id"))?;
        shipment.tracking_code = ColumnConverter::read(row, &column(prefix, "tracking_code"))?;
        shipment.date = ColumnConverter::read(row, &column(prefix, "date"))?;
        shipment.details = ColumnConverter::read(row, &column(prefix, "details"))?;
        shipment.set_invoice_id(ColumnConverter::read(row, &column(prefix, "invoice_id"))?);
        Ok(shipment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InvoiceStatus, OrderStatus, PaymentMethod};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement};

    async fn row(sql: &str) -> QueryResult {
        let db: DatabaseConnection = Database::connect("sqlite::memory:").await.unwrap();
        db.query_one(Statement::from_string(DbBackend::Sqlite, sql.to_string()))
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn maps_prefixed_columns() {
        let row = row(
            "SELECT 3 AS e_id, 'AAAAAAAAAA' AS e_tracking_code, \
             '1970-01-01T00:00:00Z' AS e_date, NULL AS e_details, 8 AS e_invoice_id",
        )
        .await;

        let shipment = ShipmentRowMapper.apply(&row, "e").unwrap();
        assert_eq!(shipment.id, Some(3));
        assert_eq!(shipment.tracking_code.as_deref(), Some("AAAAAAAAAA"));
        assert_eq!(shipment.date, Some(Utc.timestamp_opt(0, 0).unwrap()));
        assert_eq!(shipment.details, None);
        assert_eq!(shipment.invoice_id(), Some(8));
    }

    #[tokio::test]
    async fn absent_columns_map_to_none() {
        let row = row("SELECT 4 AS order_id, 'X-1' AS order_code").await;

        let order = ProductOrderRowMapper.apply(&row, "order").unwrap();
        assert_eq!(order.id, Some(4));
        assert_eq!(order.code.as_deref(), Some("X-1"));
        assert_eq!(order.placed_date, None);
        assert_eq!(order.status, None);
    }

    #[tokio::test]
    async fn null_join_id_yields_no_entity() {
        let row = row("SELECT 1 AS e_id, NULL AS order_id, NULL AS order_code").await;
        assert!(ProductOrderRowMapper
            .apply_optional(&row, "order")
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn reads_enums_and_normalized_decimals() {
        let row = row(
            "SELECT 1 AS e_id, 'PAID' AS e_status, 'CASH_ON_DELIVERY' AS e_payment_method, \
             '10.00' AS e_payment_amount, 'COMPLETED' AS order_status",
        )
        .await;

        let invoice = InvoiceRowMapper.apply(&row, "e").unwrap();
        assert_eq!(invoice.status, Some(InvoiceStatus::Paid));
        assert_eq!(invoice.payment_method, Some(PaymentMethod::CashOnDelivery));
        assert_eq!(invoice.payment_amount(), Some(dec!(10)));
        assert_eq!(invoice.payment_amount().unwrap().to_string(), "10");

        let order = ProductOrderRowMapper.apply(&row, "order").unwrap();
        assert_eq!(order.status, Some(OrderStatus::Completed));
    }

    #[tokio::test]
    async fn amounts_stored_as_text_keep_every_digit() {
        let row = row("SELECT 1 AS e_id, '1234567890123456.78' AS e_payment_amount").await;

        let invoice = InvoiceRowMapper.apply(&row, "e").unwrap();
        assert_eq!(invoice.payment_amount(), Some(dec!(1234567890123456.78)));
    }

    #[tokio::test]
    async fn unreadable_amount_is_an_error() {
        let row = row("SELECT 1 AS e_id, 'ten' AS e_payment_amount").await;
        assert!(InvoiceRowMapper.apply(&row, "e").is_err());
    }

    #[tokio::test]
    async fn unknown_enum_constant_is_an_error() {
        let row = row("SELECT 1 AS e_id, 'LOST' AS e_status").await;
        assert!(InvoiceRowMapper.apply(&row, "e").is_err());
    }
}
