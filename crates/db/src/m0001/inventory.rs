use sea_query::{ColumnDef, Expr, ExprTrait, Query, Table, TableCreateStatement, TableDropStatement};
use sea_query_sqlx::SqlxBinder;

use crate::table::Inventory;

/// Opening stock per SKU.
const SEED: [(&str, i64); 3] = [("Single", 100), ("Family", 100), ("Commercial", 50)];

pub struct CreateTable;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(Inventory::Table)
        .col(
            ColumnDef::new(Inventory::Sku)
                .string()
                .not_null()
                .string_len(15)
                .primary_key(),
        )
        .col(
            ColumnDef::new(Inventory::Count)
                .big_integer()
                .not_null()
                .default(0),
        )
        .col(
            ColumnDef::new(Inventory::UpdatedAt)
                .big_integer()
                .not_null()
                .default(0),
        )
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(Inventory::Table).to_owned()
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

pub struct Seed;

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for Seed {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let mut statement = Query::insert()
            .into_table(Inventory::Table)
            .columns([Inventory::Sku, Inventory::Count, Inventory::UpdatedAt])
            .to_owned();

        for (sku, count) in SEED {
            statement.values_panic([sku.into(), count.into(), 0i64.into()]);
        }

        let (sql, values) = statement.build_sqlx(sea_query::SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = Query::delete()
            .from_table(Inventory::Table)
            .and_where(Expr::col(Inventory::Sku).is_in(SEED.map(|(sku, _)| sku)))
            .to_owned();

        let (sql, values) = statement.build_sqlx(sea_query::SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(connection).await?;

        Ok(())
    }
}
