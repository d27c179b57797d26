use std::{collections::HashMap, ops::Deref};

use dgas_db::table::CylinderOrder;
use dgas_shared::order::OrderStatus;
use sea_query::{Expr, ExprTrait};
use serde::Serialize;

use crate::{Order, repository};

/// An order as staff see it, with who it is for.
#[derive(Clone, Debug, Serialize)]
pub struct StaffOrder {
    #[serde(flatten)]
    pub order: Order,
    pub customer_name: String,
    pub customer_email: String,
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
    pub async fn find(&self, id: impl AsRef<str>) -> dgas_shared::Result<Option<Order>> {
        let mut conn = self.read_db.acquire().await?;

        Ok(repository::find(&mut conn, id.as_ref())
            .await?
            .map(Order::from))
    }

    /// Most recent order of a customer, shown on the tracking page.
    pub async fn latest(&self, account_id: impl AsRef<str>) -> dgas_shared::Result<Option<Order>> {
        let statement = repository::select()
            .and_where(Expr::col(CylinderOrder::AccountId).eq(account_id.as_ref()))
            .limit(1)
            .to_owned();

        let mut conn = self.read_db.acquire().await?;
        let rows = repository::fetch_all(&mut conn, statement).await?;

        Ok(rows.into_iter().next().map(Order::from))
    }

    /// Every order of a customer, newest first.
    pub async fn history(&self, account_id: impl AsRef<str>) -> dgas_shared::Result<Vec<Order>> {
        let statement = repository::select()
            .and_where(Expr::col(CylinderOrder::AccountId).eq(account_id.as_ref()))
            .to_owned();

        let mut conn = self.read_db.acquire().await?;
        let rows = repository::fetch_all(&mut conn, statement).await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Every order in the system, newest first.
    pub async fn all(&self) -> dgas_shared::Result<Vec<StaffOrder>> {
        self.staff_orders(None).await
    }

    /// Orders a delivery partner can act on.
    pub async fn delivery_queue(&self) -> dgas_shared::Result<Vec<StaffOrder>> {
        self.staff_orders(Some(OrderStatus::OutForDelivery)).await
    }

    async fn staff_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> dgas_shared::Result<Vec<StaffOrder>> {
        let mut statement = repository::select();

        if let Some(status) = status {
            statement.and_where(Expr::col(CylinderOrder::Status).eq(status.as_ref()));
        }

        let mut conn = self.read_db.acquire().await?;
        let rows = repository::fetch_all(&mut conn, statement).await?;

        let mut ids = rows
            .iter()
            .map(|row| row.account_id.to_owned())
            .collect::<Vec<_>>();
        ids.sort();
        ids.dedup();

        let customers = repository::find_customers(&mut conn, ids)
            .await?
            .into_iter()
            .map(|c| (c.id.to_owned(), c))
            .collect::<HashMap<_, _>>();

        Ok(rows
            .into_iter()
            .map(|row| {
                let (customer_name, customer_email) = customers
                    .get(&row.account_id)
                    .map(|c| (c.full_name.to_owned(), c.email.to_owned()))
                    .unwrap_or_default();

                StaffOrder {
                    order: row.into(),
                    customer_name,
                    customer_email,
                }
            })
            .collect())
    }
}
