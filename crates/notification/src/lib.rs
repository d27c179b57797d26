use std::ops::Deref;

use dgas_db::table::FeedItem as FeedItemTable;
use dgas_shared::{Topic, notification::FeedKind};
use sea_query::{Expr, ExprTrait, Order, Query as SqlQuery, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Serialize;
use sqlx::prelude::FromRow;
use ulid::Ulid;
use validator::Validate;

#[derive(FromRow)]
struct FeedItemRow {
    id: String,
    kind: sqlx::types::Text<FeedKind>,
    title: String,
    description: String,
    created_at: i64,
}

/// A broadcast notification or promotion. Items are only ever appended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FeedItem {
    pub id: String,
    pub kind: FeedKind,
    pub title: String,
    pub description: String,
    pub created_at: i64,
}

impl From<FeedItemRow> for FeedItem {
    fn from(row: FeedItemRow) -> Self {
        Self {
            id: row.id,
            kind: row.kind.0,
            title: row.title,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(Validate)]
pub struct PublishInput {
    #[validate(length(min = 1, max = 100, message = "Please fill out both title and description."))]
    pub title: String,
    #[validate(length(min = 1, max = 1000, message = "Please fill out both title and description."))]
    pub description: String,
}

fn topic(kind: FeedKind) -> Topic {
    match kind {
        FeedKind::Notification => Topic::Notifications,
        FeedKind::Promotion => Topic::Promotions,
    }
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
    pub async fn publish(
        &self,
        kind: FeedKind,
        input: PublishInput,
    ) -> dgas_shared::Result<FeedItem> {
        let input = PublishInput {
            title: input.title.trim().to_owned(),
            description: input.description.trim().to_owned(),
        };
        input.validate()?;

        let item = FeedItem {
            id: Ulid::new().to_string(),
            kind,
            title: input.title,
            description: input.description,
            created_at: dgas_shared::now(),
        };

        let statement = SqlQuery::insert()
            .into_table(FeedItemTable::Table)
            .columns([
                FeedItemTable::Id,
                FeedItemTable::Kind,
                FeedItemTable::Title,
                FeedItemTable::Description,
                FeedItemTable::CreatedAt,
            ])
            .values_panic([
                item.id.to_owned().into(),
                kind.to_string().into(),
                item.title.to_owned().into(),
                item.description.to_owned().into(),
                item.created_at.into(),
            ])
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values)
            .execute(&self.write_db)
            .await?;

        self.changes.publish(topic(kind), &item.id);

        tracing::info!(item_id = %item.id, %kind, "feed item published");

        Ok(item)
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
    /// Items of one kind, newest first.
    pub async fn list(&self, kind: FeedKind) -> dgas_shared::Result<Vec<FeedItem>> {
        let statement = SqlQuery::select()
            .columns([
                FeedItemTable::Id,
                FeedItemTable::Kind,
                FeedItemTable::Title,
                FeedItemTable::Description,
                FeedItemTable::CreatedAt,
            ])
            .from(FeedItemTable::Table)
            .and_where(Expr::col(FeedItemTable::Kind).eq(kind.as_ref()))
            .order_by(FeedItemTable::CreatedAt, Order::Desc)
            .order_by_expr(Expr::cust("rowid"), Order::Desc)
            .limit(100)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, FeedItemRow, _>(&sql, values)
            .fetch_all(&self.read_db)
            .await?;

        Ok(rows.into_iter().map(FeedItem::from).collect())
    }
}
