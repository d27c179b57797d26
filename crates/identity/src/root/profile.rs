use dgas_shared::Error;
use validator::Validate;

use super::Profile;
use crate::repository;

#[derive(Validate)]
pub struct ProfileInput {
    #[validate(length(min = 1, max = 100))]
    pub full_name: String,
    #[validate(length(max = 500))]
    pub address: Option<String>,
}

impl super::Command {
    pub async fn profile(&self, account_id: impl AsRef<str>) -> dgas_shared::Result<Profile> {
        let mut conn = self.read_db.acquire().await?;

        repository::find(
            &mut conn,
            repository::FindType::Id(account_id.as_ref().to_owned()),
        )
        .await?
        .map(Profile::from)
        .ok_or(Error::AccountNotFound)
    }

    pub async fn update_profile(
        &self,
        account_id: impl AsRef<str>,
        input: ProfileInput,
    ) -> dgas_shared::Result<Profile> {
        let input = ProfileInput {
            full_name: input.full_name.trim().to_owned(),
            address: input
                .address
                .map(|address| address.trim().to_owned())
                .filter(|address| !address.is_empty()),
        };
        input.validate()?;

        let mut conn = self.write_db.acquire().await?;

        if !repository::update_profile(
            &mut conn,
            account_id.as_ref(),
            input.full_name,
            input.address,
        )
        .await?
        {
            return Err(Error::AccountNotFound);
        }

        drop(conn);

        self.profile(account_id).await
    }
}
