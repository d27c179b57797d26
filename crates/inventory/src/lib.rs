use std::{ops::Deref, str::FromStr};

use dgas_db::table::Inventory;
use dgas_shared::{Topic, order::CylinderType};
use sea_query::{Expr, ExprTrait, Query as SqlQuery, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Serialize;
use sqlx::prelude::FromRow;
use validator::Validate;

#[derive(FromRow)]
struct StockRow {
    sku: sqlx::types::Text<CylinderType>,
    count: i64,
    updated_at: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Stock {
    pub sku: CylinderType,
    pub label: &'static str,
    pub count: i64,
    pub updated_at: i64,
}

impl From<StockRow> for Stock {
    fn from(row: StockRow) -> Self {
        Self {
            sku: row.sku.0,
            label: row.sku.0.label(),
            count: row.count,
            updated_at: row.updated_at,
        }
    }
}

/// Resolves a SKU path segment such as `family` or `Family`.
pub fn parse_sku(value: &str) -> dgas_shared::Result<CylinderType> {
    CylinderType::from_str(value.trim())
        .map_err(|_| dgas_shared::Error::NotFound(format!("sku '{value}'")))
}

/// Upper bound of a stock count.
pub const MAX_STOCK: i64 = 1_000_000;

#[derive(Validate)]
pub struct SetStockInput {
    #[validate(range(min = 0, max = 1_000_000))]
    pub count: i64,
}

#[derive(Validate)]
pub struct AdjustStockInput {
    #[validate(range(min = -1_000_000, max = 1_000_000))]
    pub delta: i64,
}

#[derive(Clone)]
pub struct Command(pub dgas_shared::State);

impl Deref for Command {
    type Target = dgas_shared::State;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Command {
    /// Adds `delta` to the stock of `sku` in one statement, clamping to
    /// `0..=MAX_STOCK`. Concurrent adjustments all land.
    pub async fn adjust_stock(
        &self,
        sku: CylinderType,
        input: AdjustStockInput,
    ) -> dgas_shared::Result<Stock> {
        input.validate()?;

        let delta = input.delta;
        let statement = SqlQuery::update()
            .table(Inventory::Table)
            .value(
                Inventory::Count,
                Expr::cust_with_values("MIN(MAX(0, \"count\" + ?), ?)", [delta, MAX_STOCK]),
            )
            .value(Inventory::UpdatedAt, dgas_shared::now())
            .and_where(Expr::col(Inventory::Sku).eq(sku.as_ref()))
            .returning(
                SqlQuery::returning().columns([
                    Inventory::Sku,
                    Inventory::Count,
                    Inventory::UpdatedAt,
                ]),
            )
            .to_owned();

        let stock = self.write(statement).await?;

        tracing::info!(%sku, delta, count = stock.count, "stock adjusted");

        Ok(stock)
    }

    pub async fn set_stock(
        &self,
        sku: CylinderType,
        input: SetStockInput,
    ) -> dgas_shared::Result<Stock> {
        input.validate()?;

        let statement = SqlQuery::update()
            .table(Inventory::Table)
            .value(Inventory::Count, input.count)
            .value(Inventory::UpdatedAt, dgas_shared::now())
            .and_where(Expr::col(Inventory::Sku).eq(sku.as_ref()))
            .returning(
                SqlQuery::returning().columns([
                    Inventory::Sku,
                    Inventory::Count,
                    Inventory::UpdatedAt,
                ]),
            )
            .to_owned();

        let stock = self.write(statement).await?;

        tracing::info!(%sku, count = stock.count, "stock set");

        Ok(stock)
    }

    async fn write(&self, statement: sea_query::UpdateStatement) -> dgas_shared::Result<Stock> {
        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let Some(row) = sqlx::query_as_with::<_, StockRow, _>(&sql, values)
            .fetch_optional(&self.write_db)
            .await?
        else {
            dgas_shared::not_found!("sku");
        };

        let stock = Stock::from(row);
        self.changes.publish(Topic::Inventory, stock.sku.as_ref());

        Ok(stock)
    }
}

#[derive(Clone)]
pub struct Query(pub dgas_shared::State);

impl Deref for Query {
    type Target = dgas_shared::State;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Query {
    pub async fn list(&self) -> dgas_shared::Result<Vec<Stock>> {
        let statement = SqlQuery::select()
            .columns([Inventory::Sku, Inventory::Count, Inventory::UpdatedAt])
            .from(Inventory::Table)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, StockRow, _>(&sql, values)
            .fetch_all(&self.read_db)
            .await?;

        let mut stocks = rows.into_iter().map(Stock::from).collect::<Vec<_>>();
        stocks.sort_by_key(|stock| stock.sku as u8);

        Ok(stocks)
    }
}
