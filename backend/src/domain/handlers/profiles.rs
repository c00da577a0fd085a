//! Profile read and update.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::{begin, commit, persistence_error};
use crate::domain::dispatch::{Request, RequestContext, RequestHandler};
use crate::domain::ports::UnitOfWorkFactory;
use crate::domain::{DisplayName, Error, Profile, Username};

/// Change the caller's display name and/or bio.
///
/// `None` leaves a field as stored. A supplied bio replaces the stored one;
/// a blank bio clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateProfile {
    pub display_name: Option<DisplayName>,
    pub bio: Option<String>,
}

impl UpdateProfile {
    /// Parse raw inputs. A supplied but blank display name is rejected.
    pub fn try_from_parts(display_name: Option<&str>, bio: Option<&str>) -> Result<Self, Error> {
        let display_name = display_name.map(DisplayName::new).transpose()?;
        Ok(Self {
            display_name,
            bio: bio.map(str::to_owned),
        })
    }
}

impl Request for UpdateProfile {
    type Response = ();
    const NAME: &'static str = "update_profile";
}

/// Read another member's public profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetProfile {
    pub username: String,
}

impl Request for GetProfile {
    type Response = Profile;
    const NAME: &'static str = "get_profile";
}

/// Handles profile reads and updates.
pub struct ProfileService<F> {
    uow: Arc<F>,
}

impl<F> ProfileService<F> {
    pub fn new(uow: Arc<F>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<F> RequestHandler<UpdateProfile> for ProfileService<F>
where
    F: UnitOfWorkFactory,
{
    async fn handle(&self, context: &RequestContext, request: UpdateProfile) -> Result<(), Error> {
        let mut uow = begin(self.uow.as_ref()).await?;
        let mut account = context.caller.account(uow.as_ref()).await?;

        if let Some(display_name) = request.display_name {
            account.rename(display_name);
        }
        if let Some(bio) = request.bio.as_deref() {
            account.set_bio(bio);
        }
        let username = account.username().clone();
        uow.update_account(account);
        commit(uow.as_mut(), "update profile").await?;
        info!(%username, "profile updated");
        Ok(())
    }
}

#[async_trait]
impl<F> RequestHandler<GetProfile> for ProfileService<F>
where
    F: UnitOfWorkFactory,
{
    async fn handle(
        &self,
        context: &RequestContext,
        request: GetProfile,
    ) -> Result<Profile, Error> {
        context.caller.username()?;
        let not_found = || {
            Error::not_found(format!("profile {} not found", request.username))
                .with_field("username", "profile not found")
        };
        // A malformed name cannot belong to any account.
        let username = Username::new(request.username.as_str()).map_err(|_| not_found())?;
        let uow = begin(self.uow.as_ref()).await?;
        let account = uow
            .find_account(&username)
            .await
            .map_err(persistence_error)?
            .ok_or_else(not_found)?;
        Ok(Profile::from(&account))
    }
}
