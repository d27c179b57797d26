use std::ops::Deref;

use dgas_shared::{Error, identity::Role};
use serde::Serialize;

use crate::repository::{self, AccountRow};

mod login;
mod profile;
mod session;
mod signup;

pub use login::LoginInput;
pub use profile::ProfileInput;
pub use session::Session;
pub use signup::{AdminSignupInput, SignupInput};

/// Account and session rules that come from configuration.
#[derive(Clone, Debug)]
pub struct Policy {
    /// Code an employee must present to create an admin account. Admin
    /// signup is closed while this is unset.
    pub admin_signup_code: Option<String>,
    pub default_barrels: u32,
    pub validity_days: u32,
    pub session_ttl_secs: i64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            admin_signup_code: None,
            default_barrels: 12,
            validity_days: 365,
            session_ttl_secs: 7 * 24 * 60 * 60,
        }
    }
}

#[derive(Clone)]
pub struct Command {
    state: dgas_shared::State,
    policy: Policy,
}

impl Deref for Command {
    type Target = dgas_shared::State;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl Command {
    pub fn new(state: dgas_shared::State, policy: Policy) -> Self {
        Self { state, policy }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Looks up the role of an account. Anything short of a found account
    /// is reported as `AccessDenied`, never as a default role.
    pub async fn resolve_role(&self, account_id: impl AsRef<str>) -> dgas_shared::Result<Role> {
        let account_id = account_id.as_ref();
        let mut conn = match self.read_db.acquire().await {
            Ok(conn) => conn,
            Err(err) => {
                tracing::warn!(account_id, err = %err, "role lookup unavailable");
                return Err(Error::AccessDenied);
            }
        };

        match repository::find_role(&mut conn, account_id).await {
            Ok(Some(role)) => Ok(role),
            Ok(None) => {
                tracing::warn!(account_id, "role lookup for unknown account");
                Err(Error::AccessDenied)
            }
            Err(err) => {
                tracing::warn!(account_id, err = %err, "role lookup failed");
                Err(Error::AccessDenied)
            }
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub full_name: String,
    pub address: Option<String>,
    pub employee_id: Option<String>,
    pub created_at: i64,
}

impl From<AccountRow> for Profile {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            role: row.role.0,
            full_name: row.full_name,
            address: row.address,
            employee_id: row.employee_id,
            created_at: row.created_at,
        }
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
