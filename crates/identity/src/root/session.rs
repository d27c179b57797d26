use dgas_shared::{Error, identity::Role};
use serde::Serialize;

use crate::repository::{self, SessionRow};

/// An authenticated session. Handlers receive this value instead of
/// reading any ambient auth state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: String,
    pub account_id: String,
    pub role: Role,
    pub expire_at: i64,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Self {
            id: row.id,
            account_id: row.account_id,
            role: row.role.0,
            expire_at: row.expire_at,
        }
    }
}

impl super::Command {
    /// Returns the live session, or `None` when it is unknown or expired.
    /// An expired session is deleted on lookup.
    pub async fn session(&self, id: impl AsRef<str>) -> dgas_shared::Result<Option<Session>> {
        let mut conn = self.read_db.acquire().await?;
        let Some(row) = repository::find_session(&mut conn, id.as_ref()).await? else {
            return Ok(None);
        };
        drop(conn);

        let now = dgas_shared::now();

        if row.expire_at <= now {
            self.purge_expired(&row.account_id, now).await?;

            return Ok(None);
        }

        Ok(Some(row.into()))
    }

    /// Re-resolves the role behind a session and pushes its expiry out.
    /// A session whose account can no longer be resolved is torn down.
    pub async fn refresh(&self, id: impl AsRef<str>) -> dgas_shared::Result<Session> {
        let id = id.as_ref();
        let Some(current) = self.session(id).await? else {
            return Err(Error::AccessDenied);
        };

        let role: Role = match self.resolve_role(&current.account_id).await {
            Ok(role) => role,
            Err(err) => {
                self.logout(id).await?;
                return Err(err);
            }
        };

        let expire_at = dgas_shared::now() + self.policy.session_ttl_secs;
        let mut conn = self.write_db.acquire().await?;

        if !repository::update_session(&mut conn, id, role, expire_at).await? {
            return Err(Error::AccessDenied);
        }

        Ok(Session {
            role,
            expire_at,
            ..current
        })
    }

    pub(crate) async fn purge_expired(&self, account_id: &str, now: i64) -> dgas_shared::Result<()> {
        let mut conn = self.write_db.acquire().await?;
        let purged = repository::delete_session(
            &mut conn,
            repository::DeleteSession::Expired {
                account_id: account_id.to_owned(),
                now,
            },
        )
        .await?;

        if purged > 0 {
            tracing::debug!(account_id, purged, "expired sessions removed");
        }

        Ok(())
    }

    pub async fn logout(&self, id: impl AsRef<str>) -> dgas_shared::Result<()> {
        let mut conn = self.write_db.acquire().await?;
        repository::delete_session(
            &mut conn,
            repository::DeleteSession::Id(id.as_ref().to_owned()),
        )
        .await?;

        tracing::debug!(session_id = id.as_ref(), "logged out");

        Ok(())
    }
}
