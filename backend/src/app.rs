//! Application wiring: every service registered with the mediator behind
//! the host policy.

use std::sync::Arc;

use mockable::Clock;

use crate::config::{IdentitySettings, SettingsError};
use crate::domain::dispatch::{DispatchConfigError, MediatorBuilder};
use crate::domain::handlers::{
    AccountService, ActivityService, AddPhoto, AttendActivity, AttendanceService, CreateActivity,
    CurrentUser, DeleteActivity, DeletePhoto, EditActivity, GetActivity, GetProfile,
    ListActivities, Login, PhotoService, ProfileService, RegisterAccount, SetMainPhoto,
    UnattendActivity, UpdateProfile, catalogue,
};
use crate::domain::ports::{IdentityProvider, PhotoStorage, TokenIssuer, UnitOfWorkFactory};
use crate::domain::{IsActivityHost, PasswordPolicy, RequestPipeline};
use crate::outbound::memory::{InMemoryIdentityProvider, InMemoryPhotoStorage, InMemoryStore};
use crate::outbound::token::JwtTokenService;

/// Driven ports the handlers depend on.
pub struct Collaborators<F, I, T, S> {
    pub uow: Arc<F>,
    pub identity: Arc<I>,
    pub tokens: Arc<T>,
    pub photos: Arc<S>,
    pub clock: Arc<dyn Clock>,
}

/// Register one handler per catalogued request and guard host-restricted
/// requests with [`IsActivityHost`].
pub fn build_pipeline<F, I, T, S>(
    ports: Collaborators<F, I, T, S>,
) -> Result<RequestPipeline, DispatchConfigError>
where
    F: UnitOfWorkFactory + 'static,
    I: IdentityProvider + 'static,
    T: TokenIssuer + 'static,
    S: PhotoStorage + 'static,
{
    let Collaborators {
        uow,
        identity,
        tokens,
        photos,
        clock,
    } = ports;
    let activities = Arc::new(ActivityService::new(uow.clone(), clock.clone()));
    let attendance = Arc::new(AttendanceService::new(uow.clone(), clock));
    let albums = Arc::new(PhotoService::new(uow.clone(), photos));
    let profiles = Arc::new(ProfileService::new(uow.clone()));
    let accounts = Arc::new(AccountService::new(uow.clone(), identity, tokens));

    let mediator = MediatorBuilder::new()
        .register::<CreateActivity>(activities.clone())?
        .register::<EditActivity>(activities.clone())?
        .register::<DeleteActivity>(activities.clone())?
        .register::<ListActivities>(activities.clone())?
        .register::<GetActivity>(activities)?
        .register::<AttendActivity>(attendance.clone())?
        .register::<UnattendActivity>(attendance)?
        .register::<AddPhoto>(albums.clone())?
        .register::<DeletePhoto>(albums.clone())?
        .register::<SetMainPhoto>(albums)?
        .register::<UpdateProfile>(profiles.clone())?
        .register::<GetProfile>(profiles)?
        .register::<RegisterAccount>(accounts.clone())?
        .register::<Login>(accounts.clone())?
        .register::<CurrentUser>(accounts)?
        .build(&catalogue())?;

    Ok(RequestPipeline::new(
        mediator,
        Arc::new(IsActivityHost::new(uow)),
    ))
}

/// Errors raised while assembling an application.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Dispatch(#[from] DispatchConfigError),
}

/// Self-contained application over the in-memory adapters.
pub struct InMemoryApp {
    pub pipeline: RequestPipeline,
    pub store: InMemoryStore,
    pub photos: Arc<InMemoryPhotoStorage>,
    pub tokens: Arc<JwtTokenService>,
    pub password_policy: PasswordPolicy,
}

impl InMemoryApp {
    pub fn from_settings(
        settings: &IdentitySettings,
        photo_base_url: &str,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let store = InMemoryStore::new();
        let photos = Arc::new(InMemoryPhotoStorage::new(photo_base_url));
        let tokens = Arc::new(settings.token_service(clock.clone())?);
        let pipeline = build_pipeline(Collaborators {
            uow: Arc::new(store.clone()),
            identity: Arc::new(InMemoryIdentityProvider::new(store.clone())),
            tokens: tokens.clone(),
            photos: photos.clone(),
            clock,
        })?;
        Ok(Self {
            pipeline,
            store,
            photos,
            tokens,
            password_policy: settings.password_policy(),
        })
    }
}
