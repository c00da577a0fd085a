//! Registration, login, and the current-user session.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use super::{begin, conflict_for, persistence_error};
use crate::domain::dispatch::{Request, RequestContext, RequestHandler};
use crate::domain::ports::{
    IdentityError, IdentityProvider, NewAccount, TokenError, TokenIssuer, UniqueConstraint,
    UnitOfWorkFactory,
};
use crate::domain::{
    Account, DisplayName, Email, Error, LoginCredentials, Password, PasswordPolicy, SessionUser,
    Username,
};

/// Create an account and start a session for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterAccount {
    pub display_name: DisplayName,
    pub username: Username,
    pub email: Email,
    pub password: Password,
}

impl RegisterAccount {
    /// Validate raw registration inputs, reporting every invalid field.
    pub fn try_from_parts(
        display_name: &str,
        username: &str,
        email: &str,
        password: &str,
        policy: &PasswordPolicy,
    ) -> Result<Self, Error> {
        let display_name = DisplayName::new(display_name);
        let username = Username::new(username);
        let email = Email::new(email);
        let password = policy.check(password);

        match (display_name, username, email, password) {
            (Ok(display_name), Ok(username), Ok(email), Ok(password)) => Ok(Self {
                display_name,
                username,
                email,
                password,
            }),
            (display_name, username, email, password) => {
                let mut error = Error::invalid_request("registration details are invalid");
                for failure in [display_name.err(), username.err(), email.err()]
                    .into_iter()
                    .flatten()
                {
                    error = error.with_field(failure.field(), failure.to_string());
                }
                if let Err(policy_error) = password {
                    let detail: Error = policy_error.into();
                    for (field, message) in detail.fields() {
                        error = error.with_field(field.as_str(), message.as_str());
                    }
                }
                Err(error)
            }
        }
    }
}

impl Request for RegisterAccount {
    type Response = SessionUser;
    const NAME: &'static str = "register_account";
}

/// Exchange email and password for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Login {
    pub credentials: LoginCredentials,
}

impl Request for Login {
    type Response = SessionUser;
    const NAME: &'static str = "login";
}

/// Session descriptor for the caller, with a fresh token.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentUser;

impl Request for CurrentUser {
    type Response = SessionUser;
    const NAME: &'static str = "current_user";
}

/// Handles account registration and sign-in.
pub struct AccountService<F, I, T> {
    uow: Arc<F>,
    identity: Arc<I>,
    tokens: Arc<T>,
}

impl<F, I, T> AccountService<F, I, T> {
    pub fn new(uow: Arc<F>, identity: Arc<I>, tokens: Arc<T>) -> Self {
        Self {
            uow,
            identity,
            tokens,
        }
    }
}

fn map_identity_error(error: IdentityError) -> Error {
    match error {
        IdentityError::Duplicate { constraint } => {
            warn!(%constraint, "identity store rejected duplicate account");
            conflict_for(constraint)
        }
        other => {
            error!(error = %other, kind = other.kind(), "identity failure");
            Error::internal(format!("identity provider failure: {other}"))
        }
    }
}

fn map_token_error(error: TokenError) -> Error {
    error!(error = %error, kind = error.kind(), "token issuance failed");
    Error::internal(error.to_string())
}

impl<F, I, T> AccountService<F, I, T>
where
    T: TokenIssuer,
{
    async fn session(&self, account: &Account) -> Result<SessionUser, Error> {
        let token = self.tokens.issue(account).await.map_err(map_token_error)?;
        Ok(SessionUser::new(account, token))
    }
}

#[async_trait]
impl<F, I, T> RequestHandler<RegisterAccount> for AccountService<F, I, T>
where
    F: UnitOfWorkFactory,
    I: IdentityProvider,
    T: TokenIssuer,
{
    async fn handle(
        &self,
        _context: &RequestContext,
        request: RegisterAccount,
    ) -> Result<SessionUser, Error> {
        let uow = begin(self.uow.as_ref()).await?;
        let RegisterAccount {
            display_name,
            username,
            email,
            password,
        } = request;

        if uow.email_exists(&email).await.map_err(persistence_error)? {
            warn!(%email, "email already registered");
            return Err(conflict_for(UniqueConstraint::AccountEmail));
        }
        if uow.username_exists(&username).await.map_err(persistence_error)? {
            warn!(%username, "username already registered");
            return Err(conflict_for(UniqueConstraint::AccountUsername));
        }
        drop(uow);

        let account = self
            .identity
            .create_account(
                NewAccount {
                    username,
                    email,
                    display_name,
                },
                &password,
            )
            .await
            .map_err(map_identity_error)?;
        info!(username = %account.username(), "account registered");
        self.session(&account).await
    }
}

#[async_trait]
impl<F, I, T> RequestHandler<Login> for AccountService<F, I, T>
where
    F: UnitOfWorkFactory,
    I: IdentityProvider,
    T: TokenIssuer,
{
    async fn handle(
        &self,
        _context: &RequestContext,
        request: Login,
    ) -> Result<SessionUser, Error> {
        let account = self
            .identity
            .authenticate(&request.credentials)
            .await
            .map_err(map_identity_error)?;
        let Some(account) = account else {
            warn!(email = %request.credentials.email(), "login rejected");
            return Err(Error::unauthorized("invalid email or password"));
        };
        info!(username = %account.username(), "login succeeded");
        self.session(&account).await
    }
}

#[async_trait]
impl<F, I, T> RequestHandler<CurrentUser> for AccountService<F, I, T>
where
    F: UnitOfWorkFactory,
    I: IdentityProvider,
    T: TokenIssuer,
{
    async fn handle(
        &self,
        context: &RequestContext,
        _request: CurrentUser,
    ) -> Result<SessionUser, Error> {
        let uow = begin(self.uow.as_ref()).await?;
        let account = context.caller.account(uow.as_ref()).await?;
        self.session(&account).await
    }
}
