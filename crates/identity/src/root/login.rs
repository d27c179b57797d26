use argon2::{Argon2, PasswordHash, PasswordVerifier};
use dgas_shared::{Error, identity::Role};
use ulid::Ulid;
use validator::Validate;

use super::{Session, normalize_email};
use crate::repository::{self, SessionRow};

#[derive(Validate)]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    /// Portal the credentials were submitted to. The account role must
    /// match it exactly.
    pub portal: Role,
    pub user_agent: String,
}

impl super::Command {
    pub async fn login(&self, input: LoginInput) -> dgas_shared::Result<Session> {
        if input.validate().is_err() {
            return Err(Error::AuthenticationFailed);
        }

        let mut conn = self.read_db.acquire().await?;
        let Some(account) = repository::find(
            &mut conn,
            repository::FindType::Email(normalize_email(&input.email)),
        )
        .await?
        else {
            return Err(Error::AuthenticationFailed);
        };
        drop(conn);

        let parsed_hash = PasswordHash::new(&account.password)?;
        let argon2 = Argon2::default();

        if argon2
            .verify_password(input.password.as_bytes(), &parsed_hash)
            .is_err()
        {
            return Err(Error::AuthenticationFailed);
        }

        let role = self.resolve_role(&account.id).await?;

        if role != input.portal {
            tracing::warn!(
                account_id = %account.id,
                %role,
                portal = %input.portal,
                "login through the wrong portal"
            );

            return Err(Error::AccessDenied);
        }

        let now = dgas_shared::now();
        self.purge_expired(&account.id, now).await?;

        let session = SessionRow {
            id: Ulid::new().to_string(),
            account_id: account.id.to_owned(),
            role: sqlx::types::Text(role),
            expire_at: now + self.policy.session_ttl_secs,
        };

        let mut conn = self.write_db.acquire().await?;
        repository::create_session(&mut conn, &session, input.user_agent).await?;

        tracing::info!(account_id = %account.id, %role, "logged in");

        Ok(session.into())
    }
}
