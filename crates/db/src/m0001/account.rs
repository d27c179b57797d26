use sea_query::{
    ColumnDef, Index, IndexCreateStatement, IndexDropStatement, Table, TableCreateStatement,
    TableDropStatement,
};

use crate::table::Account;

pub struct CreateTable;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(Account::Table)
        .col(
            ColumnDef::new(Account::Id)
                .string()
                .not_null()
                .string_len(26)
                .primary_key(),
        )
        .col(
            ColumnDef::new(Account::Email)
                .string()
                .not_null()
                .string_len(320),
        )
        .col(ColumnDef::new(Account::Password).string().not_null())
        .col(
            ColumnDef::new(Account::Role)
                .string()
                .not_null()
                .string_len(15),
        )
        .col(
            ColumnDef::new(Account::FullName)
                .string()
                .not_null()
                .string_len(100),
        )
        .col(ColumnDef::new(Account::Address).string().string_len(500).null())
        .col(
            ColumnDef::new(Account::EmployeeId)
                .string()
                .string_len(30)
                .null(),
        )
        .col(ColumnDef::new(Account::CreatedAt).big_integer().not_null())
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(Account::Table).to_owned()
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

pub struct CreateEmailIdx;

fn create_email_idx() -> IndexCreateStatement {
    Index::create()
        .name("idx_account_email")
        .table(Account::Table)
        .unique()
        .col(Account::Email)
        .to_owned()
}

fn drop_email_idx() -> IndexDropStatement {
    Index::drop()
        .name("idx_account_email")
        .table(Account::Table)
        .to_owned()
}

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateEmailIdx {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_email_idx().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = drop_email_idx().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}
