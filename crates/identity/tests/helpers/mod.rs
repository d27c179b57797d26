use std::{path::PathBuf, str::FromStr};

use dgas_identity::{AdminSignupInput, Policy, SignupInput};
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use sqlx_migrator::{Migrate, Plan};

pub const ADMIN_CODE: &str = "let-me-in";

pub async fn setup_test_state(path: PathBuf) -> anyhow::Result<dgas_identity::Command> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.to_str().unwrap()))?
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;
    let mut conn = pool.acquire().await?;
    dgas_db::migrator()?
        .run(&mut conn, &Plan::apply_all())
        .await?;

    Ok(dgas_identity::Command::new(
        dgas_shared::State::single(pool),
        Policy {
            admin_signup_code: Some(ADMIN_CODE.to_owned()),
            ..Default::default()
        },
    ))
}

#[allow(dead_code)]
pub async fn create_customer(
    cmd: &dgas_identity::Command,
    name: impl Into<String>,
) -> anyhow::Result<String> {
    let name = name.into();

    Ok(cmd
        .signup_customer(SignupInput {
            email: format!("{name}@dgas.localhost"),
            password: "my_password".to_owned(),
            full_name: name,
        })
        .await?)
}

#[allow(dead_code)]
pub async fn create_admin(
    cmd: &dgas_identity::Command,
    name: impl Into<String>,
) -> anyhow::Result<String> {
    let name = name.into();

    Ok(cmd
        .signup_admin(AdminSignupInput {
            email: format!("{name}@dgas.localhost"),
            password: "my_password".to_owned(),
            employee_id: format!("EMP-{name}"),
            signup_code: ADMIN_CODE.to_owned(),
        })
        .await?)
}

#[allow(dead_code)]
pub async fn count_sessions(pool: &SqlitePool) -> anyhow::Result<i64> {
    let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM session")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

#[allow(dead_code)]
pub async fn expire_session(pool: &SqlitePool, id: &str) -> anyhow::Result<()> {
    sqlx::query("UPDATE session SET expire_at = ? WHERE id = ?")
        .bind(dgas_shared::now() - 60)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
