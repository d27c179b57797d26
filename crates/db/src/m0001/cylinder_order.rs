use sea_query::{
    ColumnDef, Index, IndexCreateStatement, IndexDropStatement, Table, TableCreateStatement,
    TableDropStatement,
};

use crate::table::CylinderOrder;

pub struct CreateTable;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(CylinderOrder::Table)
        .col(
            ColumnDef::new(CylinderOrder::Id)
                .string()
                .not_null()
                .string_len(26)
                .primary_key(),
        )
        .col(
            ColumnDef::new(CylinderOrder::OrderNumber)
                .string()
                .not_null()
                .string_len(10),
        )
        .col(
            ColumnDef::new(CylinderOrder::AccountId)
                .string()
                .not_null()
                .string_len(26),
        )
        .col(
            ColumnDef::new(CylinderOrder::CylinderType)
                .string()
                .not_null()
                .string_len(15),
        )
        .col(
            ColumnDef::new(CylinderOrder::DeliveryDate)
                .string()
                .not_null()
                .string_len(10),
        )
        .col(
            ColumnDef::new(CylinderOrder::DeliverySlot)
                .string()
                .not_null()
                .string_len(15),
        )
        .col(
            ColumnDef::new(CylinderOrder::Address)
                .string()
                .not_null()
                .string_len(500),
        )
        .col(
            ColumnDef::new(CylinderOrder::Payment)
                .string()
                .not_null()
                .string_len(15),
        )
        .col(
            ColumnDef::new(CylinderOrder::Total)
                .big_integer()
                .not_null()
                .default(0),
        )
        .col(
            ColumnDef::new(CylinderOrder::Status)
                .string()
                .not_null()
                .string_len(20),
        )
        .col(
            ColumnDef::new(CylinderOrder::Refunded)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(
            ColumnDef::new(CylinderOrder::CreatedAt)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(CylinderOrder::UpdatedAt)
                .big_integer()
                .not_null(),
        )
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(CylinderOrder::Table).to_owned()
}

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateTable {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_table().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = drop_table().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}

pub struct CreateAccountIdx;

fn create_account_idx() -> IndexCreateStatement {
    Index::create()
        .name("idx_cylinder_order_account_created")
        .table(CylinderOrder::Table)
        .col(CylinderOrder::AccountId)
        .col(CylinderOrder::CreatedAt)
        .to_owned()
}

fn drop_account_idx() -> IndexDropStatement {
    Index::drop()
        .name("idx_cylinder_order_account_created")
        .table(CylinderOrder::Table)
        .to_owned()
}

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateAccountIdx {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_account_idx().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = drop_account_idx().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}

pub struct CreateStatusIdx;

fn create_status_idx() -> IndexCreateStatement {
    Index::create()
        .name("idx_cylinder_order_status")
        .table(CylinderOrder::Table)
        .col(CylinderOrder::Status)
        .to_owned()
}

fn drop_status_idx() -> IndexDropStatement {
    Index::drop()
        .name("idx_cylinder_order_status")
        .table(CylinderOrder::Table)
        .to_owned()
}

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateStatusIdx {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_status_idx().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = drop_status_idx().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}
