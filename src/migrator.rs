use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_product_order_table::Migration),
            Box::new(m20240101_000002_create_invoice_table::Migration),
            Box::new(m20240101_000003_create_shipment_table::Migration),
        ]
    }
}

mod m20240101_000001_create_product_order_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_product_order_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductOrder::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductOrder::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ProductOrder::PlacedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductOrder::Status).string_len(32).not_null())
                        .col(ColumnDef::new(ProductOrder::Code).string().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductOrder::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum ProductOrder {
        Table,
        Id,
        PlacedDate,
        Status,
        Code,
    }
}

mod m20240101_000002_create_invoice_table {
    use super::m20240101_000001_create_product_order_table::ProductOrder;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_invoice_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Invoice::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Invoice::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Invoice::Date)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Invoice::Details).string().null())
                        .col(ColumnDef::new(Invoice::Status).string_len(32).not_null())
                        .col(
                            ColumnDef::new(Invoice::PaymentMethod)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Invoice::PaymentDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(payment_amount_column(manager))
                        .col(ColumnDef::new(Invoice::OrderId).big_integer().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_invoice_order_id")
                                .from(Invoice::Table, Invoice::OrderId)
                                .to(ProductOrder::Table, ProductOrder::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_invoice_order_id")
                        .table(Invoice::Table)
                        .col(Invoice::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Invoice::Table).to_owned())
                .await
        }
    }

    /// SQLite has no exact decimal storage (a REAL keeps 15 significant
    /// digits), so there the amount is kept as its decimal text.
    fn payment_amount_column(manager: &SchemaManager) -> ColumnDef {
        let mut column = ColumnDef::new(Invoice::PaymentAmount);
        match manager.get_database_backend() {
            sea_orm::DbBackend::Sqlite => column.text(),
            _ => column.decimal_len(21, 2),
        };
        column.not_null();
        column
    }

    #[derive(DeriveIden)]
    pub enum Invoice {
        Table,
        Id,
        Date,
        Details,
        Status,
        PaymentMethod,
        PaymentDate,
        PaymentAmount,
        OrderId,
    }
}

mod m20240101_000003_create_shipment_table {
    use super::m20240101_000002_create_invoice_table::Invoice;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_shipment_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Shipment::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Shipment::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Shipment::TrackingCode).string().null())
                        .col(
                            ColumnDef::new(Shipment::Date)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Shipment::Details).string().null())
                        .col(ColumnDef::new(Shipment::InvoiceId).big_integer().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_shipment_invoice_id")
                                .from(Shipment::Table, Shipment::InvoiceId)
                                .to(Invoice::Table, Invoice::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_shipment_invoice_id")
                        .table(Shipment::Table)
                        .col(Shipment::InvoiceId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Shipment::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Shipment {
        Table,
        Id,
        TrackingCode,
        Date,
        Details,
        InvoiceId,
    }
}
