use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use dgas_shared::{Error, identity::Role};
use ulid::Ulid;
use validator::Validate;

use super::normalize_email;
use crate::repository::{self, CreateInput};

#[derive(Validate)]
pub struct SignupInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub full_name: String,
}

#[derive(Validate)]
pub struct AdminSignupInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 30))]
    pub employee_id: String,
    pub signup_code: String,
}

fn hash_password(password: &str) -> dgas_shared::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    Ok(argon2.hash_password(password.as_bytes(), &salt)?.to_string())
}

impl super::Command {
    /// Creates a customer account and opens its subscription in the same
    /// transaction.
    pub async fn signup_customer(&self, input: SignupInput) -> dgas_shared::Result<String> {
        input.validate()?;

        let password = hash_password(&input.password)?;
        let id = Ulid::new().to_string();
        let mut tx = self.write_db.begin().await?;

        repository::create(
            &mut tx,
            CreateInput {
                id: id.to_owned(),
                email: normalize_email(&input.email),
                password,
                role: Role::Customer,
                full_name: input.full_name.trim().to_owned(),
                employee_id: None,
            },
        )
        .await?;

        dgas_subscription::open(
            &mut tx,
            &id,
            self.policy.default_barrels,
            self.policy.validity_days,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(account_id = %id, "customer signed up");

        Ok(id)
    }

    pub async fn signup_delivery_partner(&self, input: SignupInput) -> dgas_shared::Result<String> {
        input.validate()?;

        let password = hash_password(&input.password)?;
        let id = Ulid::new().to_string();
        let mut conn = self.write_db.acquire().await?;

        repository::create(
            &mut conn,
            CreateInput {
                id: id.to_owned(),
                email: normalize_email(&input.email),
                password,
                role: Role::DeliveryPartner,
                full_name: input.full_name.trim().to_owned(),
                employee_id: None,
            },
        )
        .await?;

        tracing::info!(account_id = %id, "delivery partner signed up");

        Ok(id)
    }

    pub async fn signup_admin(&self, input: AdminSignupInput) -> dgas_shared::Result<String> {
        let Some(code) = self
            .policy
            .admin_signup_code
            .as_deref()
            .filter(|code| !code.is_empty())
        else {
            return Err(Error::AccessDenied);
        };

        if input.signup_code != code {
            tracing::warn!(email = %input.email, "admin signup with a wrong code");
            return Err(Error::AccessDenied);
        }

        input.validate()?;

        let employee_id = input.employee_id.trim().to_owned();
        self.create_admin(&input.email, &input.password, employee_id)
            .await
    }

    /// Makes sure the configured root admin exists. Returns false when the
    /// account was already there.
    pub async fn seed_root(
        &self,
        email: impl AsRef<str>,
        password: impl AsRef<str>,
    ) -> dgas_shared::Result<bool> {
        let email = normalize_email(email.as_ref());
        let mut conn = self.read_db.acquire().await?;

        if let Some(account) =
            repository::find(&mut conn, repository::FindType::Email(email.to_owned())).await?
        {
            if account.role.0 != Role::Admin {
                tracing::warn!(%email, role = %account.role.0, "root email belongs to a non admin account");
            }

            return Ok(false);
        }

        drop(conn);

        self.create_admin(&email, password.as_ref(), "root".to_owned())
            .await?;

        Ok(true)
    }

    async fn create_admin(
        &self,
        email: &str,
        password: &str,
        employee_id: String,
    ) -> dgas_shared::Result<String> {
        let password = hash_password(password)?;
        let id = Ulid::new().to_string();
        let mut conn = self.write_db.acquire().await?;

        repository::create(
            &mut conn,
            CreateInput {
                id: id.to_owned(),
                email: normalize_email(email),
                password,
                role: Role::Admin,
                full_name: String::new(),
                employee_id: Some(employee_id),
            },
        )
        .await?;

        tracing::info!(account_id = %id, "admin account created");

        Ok(id)
    }

    /// Maintenance path for changing a role. Open sessions of the account
    /// are dropped so the new role applies from the next login.
    pub async fn set_role(&self, email: impl AsRef<str>, role: Role) -> dgas_shared::Result<String> {
        let email = normalize_email(email.as_ref());
        let mut tx = self.write_db.begin().await?;

        let Some(account) = repository::find(&mut tx, repository::FindType::Email(email)).await?
        else {
            return Err(Error::AccountNotFound);
        };

        repository::update_role(&mut tx, &account.id, role).await?;
        repository::delete_session(
            &mut tx,
            repository::DeleteSession::Account(account.id.to_owned()),
        )
        .await?;

        if role == Role::Customer
            && dgas_subscription::find(&mut tx, &account.id).await?.is_none()
        {
            dgas_subscription::open(
                &mut tx,
                &account.id,
                self.policy.default_barrels,
                self.policy.validity_days,
            )
            .await?;
        }

        tx.commit().await?;

        tracing::info!(account_id = %account.id, %role, "role changed");

        Ok(account.id)
    }
}
