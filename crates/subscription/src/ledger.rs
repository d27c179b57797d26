use dgas_db::table::Subscription;
use dgas_shared::{Error, subscription::SubscriptionStatus};
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Serialize;
use sqlx::SqliteConnection;

use crate::repository::{self, SubscriptionRow};

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Current state of a customer's barrel allowance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Ledger {
    pub account_id: String,
    pub barrels_remaining: i64,
    pub expire_at: i64,
    pub status: SubscriptionStatus,
    pub updated_at: i64,
}

impl Ledger {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expire_at <= now
    }

    /// Whether a subscription booking would be granted right now.
    pub fn can_book(&self, now: i64) -> bool {
        self.status == SubscriptionStatus::Active
            && !self.is_expired(now)
            && self.barrels_remaining > 0
    }

    fn denial(&self, now: i64) -> Error {
        if self.status != SubscriptionStatus::Active {
            Error::SubscriptionInactive
        } else if self.is_expired(now) {
            Error::SubscriptionExpired
        } else {
            Error::InsufficientCredit
        }
    }
}

impl From<SubscriptionRow> for Ledger {
    fn from(row: SubscriptionRow) -> Self {
        Self {
            account_id: row.account_id,
            barrels_remaining: row.barrels_remaining,
            expire_at: row.expire_at,
            status: row.status.0,
            updated_at: row.updated_at,
        }
    }
}

/// Opens the subscription of a freshly created customer account.
pub async fn open(
    conn: &mut SqliteConnection,
    account_id: &str,
    barrels: u32,
    validity_days: u32,
) -> dgas_shared::Result<()> {
    let expire_at = dgas_shared::now() + i64::from(validity_days) * SECONDS_PER_DAY;
    repository::create(conn, account_id, i64::from(barrels), expire_at).await
}

pub async fn find(
    conn: &mut SqliteConnection,
    account_id: &str,
) -> dgas_shared::Result<Option<Ledger>> {
    Ok(repository::find(conn, account_id).await?.map(Ledger::from))
}

/// Takes one barrel off the balance and returns what is left.
///
/// Runs on the caller's connection, normally inside the transaction that
/// also inserts the order. The decrement is a single conditional UPDATE,
/// so two concurrent callers at balance 1 cannot both succeed. When
/// nothing is updated the current row is read back to report why.
pub async fn reserve_barrel(
    conn: &mut SqliteConnection,
    account_id: &str,
) -> dgas_shared::Result<i64> {
    let now = dgas_shared::now();
    let statement = Query::update()
        .table(Subscription::Table)
        .value(
            Subscription::BarrelsRemaining,
            Expr::col(Subscription::BarrelsRemaining).sub(1),
        )
        .value(Subscription::UpdatedAt, now)
        .and_where(Expr::col(Subscription::AccountId).eq(account_id))
        .and_where(Expr::col(Subscription::Status).eq(SubscriptionStatus::Active.as_ref()))
        .and_where(Expr::col(Subscription::ExpireAt).gt(now))
        .and_where(Expr::col(Subscription::BarrelsRemaining).gt(0))
        .returning_col(Subscription::BarrelsRemaining)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let remaining = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
        .fetch_optional(&mut *conn)
        .await?;

    if let Some((remaining,)) = remaining {
        tracing::debug!(account_id, remaining, "barrel reserved");
        return Ok(remaining);
    }

    let Some(ledger) = find(conn, account_id).await? else {
        return Err(Error::AccountNotFound);
    };

    Err(ledger.denial(now))
}

/// Credits one barrel back. Only the order lifecycle calls this, and only
/// once per rejected subscription order.
pub async fn refund_barrel(
    conn: &mut SqliteConnection,
    account_id: &str,
) -> dgas_shared::Result<i64> {
    let statement = Query::update()
        .table(Subscription::Table)
        .value(
            Subscription::BarrelsRemaining,
            Expr::col(Subscription::BarrelsRemaining).add(1),
        )
        .value(Subscription::UpdatedAt, dgas_shared::now())
        .and_where(Expr::col(Subscription::AccountId).eq(account_id))
        .returning_col(Subscription::BarrelsRemaining)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let Some((remaining,)) = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
        .fetch_optional(&mut *conn)
        .await?
    else {
        return Err(Error::AccountNotFound);
    };

    tracing::debug!(account_id, remaining, "barrel refunded");

    Ok(remaining)
}
