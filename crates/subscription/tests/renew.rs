use dgas_shared::{Error, subscription::SubscriptionStatus};
use dgas_subscription::RenewInput;
use temp_dir::TempDir;

mod helpers;

#[tokio::test]
async fn renew_adds_barrels_and_reactivates() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let command = dgas_subscription::Command::new(state.clone());
    helpers::open_subscription(&state.write_db, "cust-1", 1, 0).await?;
    command.deactivate("cust-1").await?;

    let before = dgas_shared::now();
    let ledger = command
        .renew(
            "cust-1",
            RenewInput {
                barrels: 6,
                validity_days: 30,
            },
        )
        .await?;

    assert_eq!(ledger.barrels_remaining, 7);
    assert_eq!(ledger.status, SubscriptionStatus::Active);
    assert!(ledger.expire_at >= before + 30 * dgas_subscription::SECONDS_PER_DAY);
    assert!(ledger.can_book(dgas_shared::now()));

    Ok(())
}

#[tokio::test]
async fn renew_validates_input_and_account() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let command = dgas_subscription::Command::new(state);

    let err = command
        .renew(
            "cust-1",
            RenewInput {
                barrels: 0,
                validity_days: 30,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validate(_)));

    let err = command
        .renew(
            "cust-1",
            RenewInput {
                barrels: 1,
                validity_days: 30,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AccountNotFound));

    let err = command.activate("cust-1").await.unwrap_err();
    assert!(matches!(err, Error::AccountNotFound));

    Ok(())
}
