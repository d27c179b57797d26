use dgas_db::table::{Account, Session};
use dgas_shared::identity::Role;
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqliteConnection, prelude::FromRow};

#[derive(FromRow)]
pub(crate) struct AccountRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub role: sqlx::types::Text<Role>,
    pub full_name: String,
    pub address: Option<String>,
    pub employee_id: Option<String>,
    pub created_at: i64,
}

pub(crate) enum FindType {
    Id(String),
    Email(String),
}

pub(crate) async fn find(
    conn: &mut SqliteConnection,
    arg_type: FindType,
) -> dgas_shared::Result<Option<AccountRow>> {
    let mut statement = Query::select()
        .columns([
            Account::Id,
            Account::Email,
            Account::Password,
            Account::Role,
            Account::FullName,
            Account::Address,
            Account::EmployeeId,
            Account::CreatedAt,
        ])
        .from(Account::Table)
        .limit(1)
        .to_owned();

    match arg_type {
        FindType::Id(id) => statement.and_where(Expr::col(Account::Id).eq(id)),
        FindType::Email(email) => statement.and_where(Expr::col(Account::Email).eq(email)),
    };

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, AccountRow, _>(&sql, values)
        .fetch_optional(&mut *conn)
        .await?)
}

pub(crate) async fn find_role(
    conn: &mut SqliteConnection,
    id: &str,
) -> dgas_shared::Result<Option<Role>> {
    let statement = Query::select()
        .column(Account::Role)
        .from(Account::Table)
        .and_where(Expr::col(Account::Id).eq(id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let row = sqlx::query_as_with::<_, (sqlx::types::Text<Role>,), _>(&sql, values)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.map(|(role,)| role.0))
}

pub(crate) struct CreateInput {
    pub id: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub full_name: String,
    pub employee_id: Option<String>,
}

pub(crate) async fn create(
    conn: &mut SqliteConnection,
    input: CreateInput,
) -> dgas_shared::Result<()> {
    let statement = Query::insert()
        .into_table(Account::Table)
        .columns([
            Account::Id,
            Account::Email,
            Account::Password,
            Account::Role,
            Account::FullName,
            Account::EmployeeId,
            Account::CreatedAt,
        ])
        .values_panic([
            input.id.into(),
            input.email.into(),
            input.password.into(),
            input.role.to_string().into(),
            input.full_name.into(),
            input.employee_id.into(),
            dgas_shared::now().into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    match sqlx::query_with(&sql, values).execute(&mut *conn).await {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            dgas_shared::user!("Email already exists");
        }
        Err(e) => Err(e.into()),
    }
}

pub(crate) async fn update_profile(
    conn: &mut SqliteConnection,
    id: &str,
    full_name: String,
    address: Option<String>,
) -> dgas_shared::Result<bool> {
    let statement = Query::update()
        .table(Account::Table)
        .value(Account::FullName, full_name)
        .value(Account::Address, address)
        .and_where(Expr::col(Account::Id).eq(id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(result.rows_affected() == 1)
}

pub(crate) async fn update_role(
    conn: &mut SqliteConnection,
    id: &str,
    role: Role,
) -> dgas_shared::Result<()> {
    let statement = Query::update()
        .table(Account::Table)
        .value(Account::Role, role.as_ref())
        .and_where(Expr::col(Account::Id).eq(id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(())
}

#[derive(FromRow)]
pub(crate) struct SessionRow {
    pub id: String,
    pub account_id: String,
    pub role: sqlx::types::Text<Role>,
    pub expire_at: i64,
}

pub(crate) async fn create_session(
    conn: &mut SqliteConnection,
    row: &SessionRow,
    user_agent: String,
) -> dgas_shared::Result<()> {
    let statement = Query::insert()
        .into_table(Session::Table)
        .columns([
            Session::Id,
            Session::AccountId,
            Session::Role,
            Session::UserAgent,
            Session::CreatedAt,
            Session::ExpireAt,
        ])
        .values_panic([
            row.id.to_owned().into(),
            row.account_id.to_owned().into(),
            row.role.0.to_string().into(),
            user_agent.into(),
            dgas_shared::now().into(),
            row.expire_at.into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(())
}

pub(crate) async fn find_session(
    conn: &mut SqliteConnection,
    id: &str,
) -> dgas_shared::Result<Option<SessionRow>> {
    let statement = Query::select()
        .columns([
            Session::Id,
            Session::AccountId,
            Session::Role,
            Session::ExpireAt,
        ])
        .from(Session::Table)
        .and_where(Expr::col(Session::Id).eq(id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, SessionRow, _>(&sql, values)
        .fetch_optional(&mut *conn)
        .await?)
}

pub(crate) async fn update_session(
    conn: &mut SqliteConnection,
    id: &str,
    role: Role,
    expire_at: i64,
) -> dgas_shared::Result<bool> {
    let statement = Query::update()
        .table(Session::Table)
        .value(Session::Role, role.as_ref())
        .value(Session::ExpireAt, expire_at)
        .and_where(Expr::col(Session::Id).eq(id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(result.rows_affected() == 1)
}

pub(crate) enum DeleteSession {
    Id(String),
    Account(String),
    /// Sessions of an account that expired at or before `now`.
    Expired { account_id: String, now: i64 },
}

pub(crate) async fn delete_session(
    conn: &mut SqliteConnection,
    target: DeleteSession,
) -> dgas_shared::Result<u64> {
    let mut statement = Query::delete().from_table(Session::Table).to_owned();

    match target {
        DeleteSession::Id(id) => statement.and_where(Expr::col(Session::Id).eq(id)),
        DeleteSession::Account(id) => statement.and_where(Expr::col(Session::AccountId).eq(id)),
        DeleteSession::Expired { account_id, now } => statement
            .and_where(Expr::col(Session::AccountId).eq(account_id))
            .and_where(Expr::col(Session::ExpireAt).lte(now)),
    };

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(result.rows_affected())
}
