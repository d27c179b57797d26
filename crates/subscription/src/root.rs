use std::ops::Deref;

use dgas_shared::{Error, subscription::SubscriptionStatus};
use validator::Validate;

use crate::{Ledger, SECONDS_PER_DAY, repository};

#[derive(Validate)]
pub struct RenewInput {
    #[validate(range(min = 1, max = 100))]
    pub barrels: u32,
    #[validate(range(min = 1, max = 3650))]
    pub validity_days: u32,
}

/// Admin side of the ledger. Booking and refunds go through
/// [`crate::reserve_barrel`] and [`crate::refund_barrel`] on the order
/// transaction instead.
#[derive(Clone)]
pub struct Command {
    state: dgas_shared::State,
}

impl Deref for Command {
    type Target = dgas_shared::State;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl Command {
    pub fn new(state: dgas_shared::State) -> Self {
        Self { state }
    }

    pub async fn load(&self, account_id: impl AsRef<str>) -> dgas_shared::Result<Ledger> {
        let mut conn = self.read_db.acquire().await?;

        crate::find(&mut conn, account_id.as_ref())
            .await?
            .ok_or(Error::AccountNotFound)
    }

    pub async fn renew(
        &self,
        account_id: impl AsRef<str>,
        input: RenewInput,
    ) -> dgas_shared::Result<Ledger> {
        input.validate()?;

        let account_id = account_id.as_ref();
        let mut tx = self.write_db.begin().await?;

        if !repository::extend(
            &mut tx,
            account_id,
            i64::from(input.barrels),
            i64::from(input.validity_days) * SECONDS_PER_DAY,
        )
        .await?
        {
            return Err(Error::AccountNotFound);
        }

        let ledger = crate::find(&mut tx, account_id)
            .await?
            .ok_or(Error::AccountNotFound)?;

        tx.commit().await?;

        tracing::info!(
            account_id,
            barrels = input.barrels,
            validity_days = input.validity_days,
            "subscription renewed"
        );

        Ok(ledger)
    }

    pub async fn activate(&self, account_id: impl AsRef<str>) -> dgas_shared::Result<Ledger> {
        self.set_status(account_id.as_ref(), SubscriptionStatus::Active)
            .await
    }

    pub async fn deactivate(&self, account_id: impl AsRef<str>) -> dgas_shared::Result<Ledger> {
        self.set_status(account_id.as_ref(), SubscriptionStatus::Inactive)
            .await
    }

    async fn set_status(
        &self,
        account_id: &str,
        status: SubscriptionStatus,
    ) -> dgas_shared::Result<Ledger> {
        let mut tx = self.write_db.begin().await?;

        if !repository::set_status(&mut tx, account_id, status).await? {
            return Err(Error::AccountNotFound);
        }

        let ledger = crate::find(&mut tx, account_id)
            .await?
            .ok_or(Error::AccountNotFound)?;

        tx.commit().await?;

        tracing::info!(account_id, %status, "subscription status changed");

        Ok(ledger)
    }
}
