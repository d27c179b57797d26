use sea_query::{ColumnDef, Table, TableCreateStatement, TableDropStatement};

use crate::table::Session;

pub struct CreateTable;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(Session::Table)
        .col(
            ColumnDef::new(Session::Id)
                .string()
                .not_null()
                .string_len(26)
                .primary_key(),
        )
        .col(
            ColumnDef::new(Session::AccountId)
                .string()
                .not_null()
                .string_len(26),
        )
        .col(
            ColumnDef::new(Session::Role)
                .string()
                .not_null()
                .string_len(15),
        )
        .col(
            ColumnDef::new(Session::UserAgent)
                .string()
                .not_null()
                .string_len(500),
        )
        .col(ColumnDef::new(Session::CreatedAt).big_integer().not_null())
        .col(ColumnDef::new(Session::ExpireAt).big_integer().not_null())
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(Session::Table).to_owned()
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
