use std::{path::PathBuf, str::FromStr, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use sqlx_migrator::{Migrate, Plan};

pub async fn setup_test_state(path: PathBuf) -> anyhow::Result<dgas_shared::State> {
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

    Ok(dgas_shared::State::single(pool))
}

#[allow(dead_code)]
pub async fn open_subscription(
    pool: &SqlitePool,
    account_id: &str,
    barrels: u32,
    validity_days: u32,
) -> anyhow::Result<()> {
    let mut conn = pool.acquire().await?;
    dgas_subscription::open(&mut conn, account_id, barrels, validity_days).await?;

    Ok(())
}
