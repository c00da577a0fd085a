//! The identity a request runs as.
//!
//! The boundary verifies the bearer credential and hands the domain a
//! [`Caller`]; handlers resolve it to an [`Account`] through the current
//! unit of work instead of looking usernames up themselves.

use super::ports::UnitOfWork;
use super::{Account, Error, Username};

/// Who issued the request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Caller {
    #[default]
    Anonymous,
    Authenticated(Username),
}

impl Caller {
    pub fn authenticated(username: Username) -> Self {
        Self::Authenticated(username)
    }

    /// The verified username, or `Unauthorized` for anonymous callers.
    pub fn username(&self) -> Result<&Username, Error> {
        match self {
            Self::Authenticated(username) => Ok(username),
            Self::Anonymous => Err(Error::unauthorized("authentication required")),
        }
    }

    /// Load the caller's account.
    ///
    /// A verified token whose account no longer exists yields `NotFound`.
    pub async fn account(&self, uow: &dyn UnitOfWork) -> Result<Account, Error> {
        let username = self.username()?;
        uow.find_account(username)
            .await
            .map_err(super::handlers::persistence_error)?
            .ok_or_else(|| {
                Error::not_found(format!("account {username} not found"))
                    .with_field("username", "account not found")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockUnitOfWork, PersistenceError};
    use crate::domain::{AccountId, DisplayName, Email, ErrorCode};
    use rstest::rstest;

    fn dave() -> Username {
        Username::new("dave").expect("username")
    }

    #[rstest]
    #[tokio::test]
    async fn anonymous_callers_are_unauthorized() {
        let uow = MockUnitOfWork::new();
        let err = Caller::Anonymous
            .account(&uow)
            .await
            .expect_err("anonymous caller has no account");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_accounts_are_not_found() {
        let mut uow = MockUnitOfWork::new();
        uow.expect_find_account().times(1).return_once(|_| Ok(None));
        let err = Caller::authenticated(dave())
            .account(&uow)
            .await
            .expect_err("unknown account");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn resolves_the_callers_account() {
        let account = Account::new(
            AccountId::random(),
            dave(),
            Email::new("dave@example.com").expect("email"),
            DisplayName::new("Dave").expect("display name"),
        );
        let expected = account.clone();
        let mut uow = MockUnitOfWork::new();
        uow.expect_find_account()
            .withf(|username| username.as_ref() == "dave")
            .times(1)
            .return_once(move |_| Ok(Some(account)));

        let resolved = Caller::authenticated(dave())
            .account(&uow)
            .await
            .expect("account resolves");
        assert_eq!(resolved, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn storage_failures_are_internal() {
        let mut uow = MockUnitOfWork::new();
        uow.expect_find_account()
            .times(1)
            .return_once(|_| Err(PersistenceError::connection("down")));
        let err = Caller::authenticated(dave())
            .account(&uow)
            .await
            .expect_err("storage failure");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
