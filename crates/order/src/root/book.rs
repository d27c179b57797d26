use std::sync::LazyLock;

use dgas_db::table::Account;
use dgas_shared::{
    Error, Topic,
    order::{CylinderType, DeliverySlot, OrderStatus, Payment},
};
use regex::Regex;
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, macros::format_description};
use ulid::Ulid;
use validator::Validate;

use super::Order;
use crate::repository::{self, OrderRow};

static RE_CARD_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}( ?[0-9]{4}){2}( ?[0-9]{1,7})$").unwrap());
static RE_EXPIRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/[0-9]{2}$").unwrap());
static RE_CVV: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{3,4}$").unwrap());

/// What the customer picked on the booking form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingInput {
    pub cylinder_type: CylinderType,
    /// Calendar date, `YYYY-MM-DD`.
    pub delivery_date: String,
    pub delivery_slot: DeliverySlot,
}

impl BookingInput {
    /// Rejects a draft that booking would refuse for its date.
    pub fn check(&self) -> dgas_shared::Result<()> {
        parse_delivery_date(&self.delivery_date, OffsetDateTime::now_utc().date())?;

        Ok(())
    }
}

/// Card details for the simulated payment. Checked, never stored.
#[derive(Validate, Deserialize)]
pub struct CardInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(regex(path = *RE_CARD_NUMBER, message = "Invalid card number"))]
    pub number: String,
    #[validate(regex(path = *RE_EXPIRY, message = "Expiry must be MM/YY"))]
    pub expiry: String,
    #[validate(regex(path = *RE_CVV, message = "Invalid CVV"))]
    pub cvv: String,
}

impl CardInput {
    fn check_not_expired(&self, today: Date) -> dgas_shared::Result<()> {
        let Some((month, year)) = self.expiry.split_once('/') else {
            dgas_shared::user!("Expiry must be MM/YY");
        };

        let (Ok(month), Ok(year)) = (month.parse::<u8>(), year.parse::<i32>()) else {
            dgas_shared::user!("Expiry must be MM/YY");
        };

        let year = 2000 + year;
        let current_month = u8::from(today.month());

        if year < today.year() || (year == today.year() && month < current_month) {
            dgas_shared::user!("Card has expired");
        }

        Ok(())
    }
}

fn parse_delivery_date(value: &str, today: Date) -> dgas_shared::Result<Date> {
    let format = format_description!("[year]-[month]-[day]");
    let Ok(date) = Date::parse(value.trim(), format) else {
        dgas_shared::user!("Delivery date must be YYYY-MM-DD");
    };

    if date < today {
        dgas_shared::user!("Delivery date cannot be in the past");
    }

    Ok(date)
}

fn order_number(id: &Ulid) -> String {
    format!("DGAS{:05}", id.random() % 100_000)
}

impl super::Command {
    async fn delivery_address(&self, account_id: &str) -> dgas_shared::Result<String> {
        let statement = Query::select()
            .column(Account::Address)
            .from(Account::Table)
            .and_where(Expr::col(Account::Id).eq(account_id))
            .limit(1)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let Some((address,)) = sqlx::query_as_with::<_, (Option<String>,), _>(&sql, values)
            .fetch_optional(&self.read_db)
            .await?
        else {
            return Err(Error::AccountNotFound);
        };

        address
            .map(|address| address.trim().to_owned())
            .filter(|address| !address.is_empty())
            .ok_or(Error::AddressMissing)
    }

    fn new_order(
        account_id: &str,
        booking: &BookingInput,
        delivery_date: Date,
        address: String,
        payment: Payment,
    ) -> OrderRow {
        let id = Ulid::new();
        let now = dgas_shared::now();
        let (total, status) = match payment {
            Payment::Subscription => (0, OrderStatus::PendingApproval),
            Payment::Card => (
                dgas_shared::order::card_total(booking.cylinder_type, booking.delivery_slot),
                OrderStatus::Confirmed,
            ),
        };

        OrderRow {
            id: id.to_string(),
            order_number: order_number(&id),
            account_id: account_id.to_owned(),
            cylinder_type: sqlx::types::Text(booking.cylinder_type),
            delivery_date: delivery_date.to_string(),
            delivery_slot: sqlx::types::Text(booking.delivery_slot),
            address,
            payment: sqlx::types::Text(payment),
            total,
            status: sqlx::types::Text(status),
            refunded: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Books against the subscription. The barrel reservation and the
    /// order insert commit together or not at all.
    pub async fn book_with_subscription(
        &self,
        account_id: impl AsRef<str>,
        booking: BookingInput,
    ) -> dgas_shared::Result<Order> {
        let account_id = account_id.as_ref();
        let delivery_date =
            parse_delivery_date(&booking.delivery_date, OffsetDateTime::now_utc().date())?;
        let address = self.delivery_address(account_id).await?;
        let row = Self::new_order(
            account_id,
            &booking,
            delivery_date,
            address,
            Payment::Subscription,
        );

        let mut tx = self.write_db.begin().await?;
        let remaining = dgas_subscription::reserve_barrel(&mut tx, account_id).await?;
        repository::create(&mut tx, &row).await?;
        tx.commit().await?;

        self.changes.publish(Topic::Orders, &row.id);

        tracing::info!(
            order_id = %row.id,
            account_id,
            cylinder_type = %booking.cylinder_type,
            remaining,
            "order booked with subscription"
        );

        Ok(row.into())
    }

    /// Paid checkout. The card is only validated; the ledger is untouched.
    pub async fn checkout(
        &self,
        account_id: impl AsRef<str>,
        booking: BookingInput,
        card: CardInput,
    ) -> dgas_shared::Result<Order> {
        card.validate()?;

        let today = OffsetDateTime::now_utc().date();
        card.check_not_expired(today)?;

        let account_id = account_id.as_ref();
        let delivery_date = parse_delivery_date(&booking.delivery_date, today)?;
        let address = self.delivery_address(account_id).await?;
        let row = Self::new_order(account_id, &booking, delivery_date, address, Payment::Card);

        let mut conn = self.write_db.acquire().await?;
        repository::create(&mut conn, &row).await?;

        self.changes.publish(Topic::Orders, &row.id);

        tracing::info!(
            order_id = %row.id,
            account_id,
            total = row.total,
            "order paid by card"
        );

        Ok(row.into())
    }
}
