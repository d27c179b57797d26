use dgas_db::table::Subscription;
use dgas_shared::subscription::SubscriptionStatus;
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqliteConnection, prelude::FromRow};

#[derive(FromRow)]
pub(crate) struct SubscriptionRow {
    pub account_id: String,
    pub barrels_remaining: i64,
    pub expire_at: i64,
    pub status: sqlx::types::Text<SubscriptionStatus>,
    pub updated_at: i64,
}

pub(crate) async fn find(
    conn: &mut SqliteConnection,
    account_id: &str,
) -> dgas_shared::Result<Option<SubscriptionRow>> {
    let statement = Query::select()
        .columns([
            Subscription::AccountId,
            Subscription::BarrelsRemaining,
            Subscription::ExpireAt,
            Subscription::Status,
            Subscription::UpdatedAt,
        ])
        .from(Subscription::Table)
        .and_where(Expr::col(Subscription::AccountId).eq(account_id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, SubscriptionRow, _>(&sql, values)
        .fetch_optional(&mut *conn)
        .await?)
}

pub(crate) async fn create(
    conn: &mut SqliteConnection,
    account_id: &str,
    barrels: i64,
    expire_at: i64,
) -> dgas_shared::Result<()> {
    let statement = Query::insert()
        .into_table(Subscription::Table)
        .columns([
            Subscription::AccountId,
            Subscription::BarrelsRemaining,
            Subscription::ExpireAt,
            Subscription::Status,
            Subscription::UpdatedAt,
        ])
        .values_panic([
            account_id.into(),
            barrels.into(),
            expire_at.into(),
            SubscriptionStatus::Active.to_string().into(),
            dgas_shared::now().into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(())
}

pub(crate) async fn set_status(
    conn: &mut SqliteConnection,
    account_id: &str,
    status: SubscriptionStatus,
) -> dgas_shared::Result<bool> {
    let statement = Query::update()
        .table(Subscription::Table)
        .value(Subscription::Status, status.as_ref())
        .value(Subscription::UpdatedAt, dgas_shared::now())
        .and_where(Expr::col(Subscription::AccountId).eq(account_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(result.rows_affected() == 1)
}

/// Adds barrels and pushes the expiry forward from whichever is later,
/// now or the current expiry. Always reactivates.
pub(crate) async fn extend(
    conn: &mut SqliteConnection,
    account_id: &str,
    barrels: i64,
    validity_secs: i64,
) -> dgas_shared::Result<bool> {
    let now = dgas_shared::now();
    let statement = Query::update()
        .table(Subscription::Table)
        .value(
            Subscription::BarrelsRemaining,
            Expr::col(Subscription::BarrelsRemaining).add(barrels),
        )
        .value(
            Subscription::ExpireAt,
            Expr::cust_with_values("MAX(\"expire_at\", ?) + ?", [now, validity_secs]),
        )
        .value(Subscription::Status, SubscriptionStatus::Active.as_ref())
        .value(Subscription::UpdatedAt, now)
        .and_where(Expr::col(Subscription::AccountId).eq(account_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(result.rows_affected() == 1)
}
