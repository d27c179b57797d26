mod change;
mod error;
pub mod identity;
pub mod notification;
pub mod order;
pub mod subscription;

pub use change::*;
pub use error::*;

#[derive(Clone)]
pub struct State {
    pub read_db: sqlx::SqlitePool,
    pub write_db: sqlx::SqlitePool,
    pub changes: ChangeFeed,
}

impl State {
    /// Single pool for both reads and writes, used by the CLI and tests.
    pub fn single(pool: sqlx::SqlitePool) -> Self {
        Self {
            read_db: pool.clone(),
            write_db: pool,
            changes: ChangeFeed::default(),
        }
    }
}

/// Current time as unix seconds.
pub fn now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}
