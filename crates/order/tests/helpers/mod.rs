use std::{path::PathBuf, str::FromStr, time::Duration};

use dgas_identity::{Policy, ProfileInput, SignupInput};
use dgas_order::BookingInput;
use dgas_shared::order::{CylinderType, DeliverySlot};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx_migrator::{Migrate, Plan};

pub struct TestState {
    pub state: dgas_shared::State,
    pub identity: dgas_identity::Command,
    pub command: dgas_order::Command,
    pub query: dgas_order::Query,
    pub subscription: dgas_subscription::Command,
}

pub async fn setup_test_state(path: PathBuf) -> anyhow::Result<TestState> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.to_str().unwrap()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(opts)
        .await?;
    let mut conn = pool.acquire().await?;
    dgas_db::migrator()?
        .run(&mut conn, &Plan::apply_all())
        .await?;

    let state = dgas_shared::State::single(pool);

    Ok(TestState {
        identity: dgas_identity::Command::new(
            state.clone(),
            Policy {
                default_barrels: 1,
                ..Default::default()
            },
        ),
        command: dgas_order::Command::new(state.clone()),
        query: dgas_order::Query(state.clone()),
        subscription: dgas_subscription::Command::new(state.clone()),
        state,
    })
}

/// Customer with one barrel and, unless `address` is None, a delivery
/// address on file.
#[allow(dead_code)]
pub async fn create_customer(
    state: &TestState,
    name: &str,
    address: Option<&str>,
) -> anyhow::Result<String> {
    let id = state
        .identity
        .signup_customer(SignupInput {
            email: format!("{name}@dgas.localhost"),
            password: "my_password".to_owned(),
            full_name: name.to_owned(),
        })
        .await?;

    state
        .identity
        .update_profile(
            &id,
            ProfileInput {
                full_name: name.to_owned(),
                address: address.map(str::to_owned),
            },
        )
        .await?;

    Ok(id)
}

#[allow(dead_code)]
pub fn tomorrow() -> String {
    (time::OffsetDateTime::now_utc().date() + time::Duration::days(1)).to_string()
}

#[allow(dead_code)]
pub fn booking(cylinder_type: CylinderType, delivery_slot: DeliverySlot) -> BookingInput {
    BookingInput {
        cylinder_type,
        delivery_date: tomorrow(),
        delivery_slot,
    }
}

#[allow(dead_code)]
pub async fn count_orders(state: &TestState) -> anyhow::Result<i64> {
    let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM cylinder_order")
        .fetch_one(&state.state.read_db)
        .await?;

    Ok(count)
}
