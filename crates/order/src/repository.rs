use dgas_db::table::{Account, CylinderOrder};
use dgas_shared::order::{CylinderType, DeliverySlot, OrderStatus, Payment};
use sea_query::{Expr, ExprTrait, Order, Query, SelectStatement, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqliteConnection, prelude::FromRow};

#[derive(FromRow)]
pub(crate) struct OrderRow {
    pub id: String,
    pub order_number: String,
    pub account_id: String,
    pub cylinder_type: sqlx::types::Text<CylinderType>,
    pub delivery_date: String,
    pub delivery_slot: sqlx::types::Text<DeliverySlot>,
    pub address: String,
    pub payment: sqlx::types::Text<Payment>,
    pub total: i64,
    pub status: sqlx::types::Text<OrderStatus>,
    pub refunded: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

pub(crate) fn select() -> SelectStatement {
    Query::select()
        .columns([
            CylinderOrder::Id,
            CylinderOrder::OrderNumber,
            CylinderOrder::AccountId,
            CylinderOrder::CylinderType,
            CylinderOrder::DeliveryDate,
            CylinderOrder::DeliverySlot,
            CylinderOrder::Address,
            CylinderOrder::Payment,
            CylinderOrder::Total,
            CylinderOrder::Status,
            CylinderOrder::Refunded,
            CylinderOrder::CreatedAt,
            CylinderOrder::UpdatedAt,
        ])
        .from(CylinderOrder::Table)
        .order_by(CylinderOrder::CreatedAt, Order::Desc)
        .order_by_expr(Expr::cust("rowid"), Order::Desc)
        .to_owned()
}

pub(crate) async fn fetch_all(
    conn: &mut SqliteConnection,
    statement: SelectStatement,
) -> dgas_shared::Result<Vec<OrderRow>> {
    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, OrderRow, _>(&sql, values)
        .fetch_all(&mut *conn)
        .await?)
}

pub(crate) async fn find(
    conn: &mut SqliteConnection,
    id: &str,
) -> dgas_shared::Result<Option<OrderRow>> {
    let statement = select()
        .and_where(Expr::col(CylinderOrder::Id).eq(id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, OrderRow, _>(&sql, values)
        .fetch_optional(&mut *conn)
        .await?)
}

pub(crate) async fn create(conn: &mut SqliteConnection, row: &OrderRow) -> dgas_shared::Result<()> {
    let statement = Query::insert()
        .into_table(CylinderOrder::Table)
        .columns([
            CylinderOrder::Id,
            CylinderOrder::OrderNumber,
            CylinderOrder::AccountId,
            CylinderOrder::CylinderType,
            CylinderOrder::DeliveryDate,
            CylinderOrder::DeliverySlot,
            CylinderOrder::Address,
            CylinderOrder::Payment,
            CylinderOrder::Total,
            CylinderOrder::Status,
            CylinderOrder::Refunded,
            CylinderOrder::CreatedAt,
            CylinderOrder::UpdatedAt,
        ])
        .values_panic([
            row.id.to_owned().into(),
            row.order_number.to_owned().into(),
            row.account_id.to_owned().into(),
            row.cylinder_type.0.to_string().into(),
            row.delivery_date.to_owned().into(),
            row.delivery_slot.0.to_string().into(),
            row.address.to_owned().into(),
            row.payment.0.to_string().into(),
            row.total.into(),
            row.status.0.to_string().into(),
            row.refunded.into(),
            row.created_at.into(),
            row.updated_at.into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(())
}

/// Moves an order from `from` to `to`. Returns false when the order is no
/// longer in `from`.
pub(crate) async fn update_status(
    conn: &mut SqliteConnection,
    id: &str,
    from: OrderStatus,
    to: OrderStatus,
) -> dgas_shared::Result<bool> {
    let statement = Query::update()
        .table(CylinderOrder::Table)
        .value(CylinderOrder::Status, to.as_ref())
        .value(CylinderOrder::UpdatedAt, dgas_shared::now())
        .and_where(Expr::col(CylinderOrder::Id).eq(id))
        .and_where(Expr::col(CylinderOrder::Status).eq(from.as_ref()))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(result.rows_affected() == 1)
}

/// Flags a subscription order as refunded. Returns true only for the
/// caller that flipped the flag.
pub(crate) async fn mark_refunded(conn: &mut SqliteConnection, id: &str) -> dgas_shared::Result<bool> {
    let statement = Query::update()
        .table(CylinderOrder::Table)
        .value(CylinderOrder::Refunded, true)
        .and_where(Expr::col(CylinderOrder::Id).eq(id))
        .and_where(Expr::col(CylinderOrder::Payment).eq(Payment::Subscription.as_ref()))
        .and_where(Expr::col(CylinderOrder::Refunded).eq(false))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(result.rows_affected() == 1)
}

#[derive(FromRow)]
pub(crate) struct CustomerRow {
    pub id: String,
    pub full_name: String,
    pub email: String,
}

pub(crate) async fn find_customers(
    conn: &mut SqliteConnection,
    ids: Vec<String>,
) -> dgas_shared::Result<Vec<CustomerRow>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    let statement = Query::select()
        .columns([
            Account::Id,
            Account::FullName,
            Account::Email,
        ])
        .from(Account::Table)
        .and_where(Expr::col(Account::Id).is_in(ids))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, CustomerRow, _>(&sql, values)
        .fetch_all(&mut *conn)
        .await?)
}
