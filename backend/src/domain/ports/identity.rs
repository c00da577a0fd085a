//! Identity collaborator: account creation with credential storage, and
//! credential checks at login. Password hashing stays inside the adapter.

use async_trait::async_trait;

use crate::domain::{Account, DisplayName, Email, LoginCredentials, Password, Username};

use super::{UniqueConstraint, define_port_error};

define_port_error! {
    /// Errors raised by identity adapters.
    pub enum IdentityError {
        /// Email or username already belongs to another account.
        Duplicate { constraint: UniqueConstraint } =>
            "identity already taken: {constraint}",
        /// The account could not be created.
        Rejected { message: String } => "account creation rejected: {message}",
        /// The credential store could not be reached.
        Unavailable { message: String } => "identity store unavailable: {message}",
    }
}

/// Profile fields of an account about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: Username,
    pub email: Email,
    pub display_name: DisplayName,
}

/// Owns credentials: account creation and password checks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Persist a new account and its hashed password.
    async fn create_account(
        &self,
        account: NewAccount,
        password: &Password,
    ) -> Result<Account, IdentityError>;

    /// Return the account when the credentials match, `None` otherwise.
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Option<Account>, IdentityError>;
}
