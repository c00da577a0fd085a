//! "Is activity host" policy evaluated before host-restricted requests.
//!
//! The policy succeeds only when the caller holds an attendance row for the
//! activity with the host flag set. A missing row, a non-host row, or an
//! anonymous caller all deny.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::dispatch::DispatchError;
use super::handlers::persistence_error;
use super::ports::UnitOfWorkFactory;
use super::{ActivityId, AttendanceKey, Caller};

/// Reasons the host policy refuses a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyDenial {
    #[error("authentication required")]
    Anonymous,
    #[error("{username} is not the host of activity {activity_id}")]
    NotHost {
        username: String,
        activity_id: ActivityId,
    },
}

/// Decides whether the caller may act as host of an activity.
///
/// Denials surface as [`DispatchError::Denied`]; lookup failures as
/// [`DispatchError::Failed`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityHostPolicy: Send + Sync {
    async fn authorize(
        &self,
        caller: &Caller,
        activity_id: &ActivityId,
    ) -> Result<(), DispatchError>;
}

/// Host policy backed by the persistence gateway.
pub struct IsActivityHost<F> {
    uow: Arc<F>,
}

impl<F> IsActivityHost<F> {
    pub fn new(uow: Arc<F>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<F> ActivityHostPolicy for IsActivityHost<F>
where
    F: UnitOfWorkFactory,
{
    async fn authorize(
        &self,
        caller: &Caller,
        activity_id: &ActivityId,
    ) -> Result<(), DispatchError> {
        let Caller::Authenticated(username) = caller else {
            return Err(PolicyDenial::Anonymous.into());
        };
        let not_host = || {
            DispatchError::Denied(PolicyDenial::NotHost {
                username: username.to_string(),
                activity_id: *activity_id,
            })
        };

        let uow = self.uow.begin().await.map_err(persistence_error)?;
        let Some(account) = uow.find_account(username).await.map_err(persistence_error)? else {
            return Err(not_host());
        };
        let key = AttendanceKey::new(account.id(), *activity_id);
        let attendance = uow.find_attendance(&key).await.map_err(persistence_error)?;
        match attendance {
            Some(attendance) if attendance.is_host() => {
                debug!(%username, %activity_id, "host policy satisfied");
                Ok(())
            }
            _ => Err(not_host()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockUnitOfWork, MockUnitOfWorkFactory, PersistenceError, UnitOfWork,
    };
    use crate::domain::{Account, AccountId, Attendance, DisplayName, Email, ErrorCode, Username};
    use chrono::Utc;
    use rstest::{fixture, rstest};

    #[fixture]
    fn frank() -> Account {
        Account::new(
            AccountId::random(),
            Username::new("frank").expect("username"),
            Email::new("frank@example.com").expect("email"),
            DisplayName::new("Frank").expect("display name"),
        )
    }

    fn factory_with(uow: MockUnitOfWork) -> Arc<MockUnitOfWorkFactory> {
        let mut factory = MockUnitOfWorkFactory::new();
        factory
            .expect_begin()
            .times(1)
            .return_once(move || Ok(Box::new(uow) as Box<dyn UnitOfWork>));
        Arc::new(factory)
    }

    fn caller(account: &Account) -> Caller {
        Caller::authenticated(account.username().clone())
    }

    #[rstest]
    #[case::host(Some(true), true)]
    #[case::attendee(Some(false), false)]
    #[case::absent(None, false)]
    #[tokio::test]
    async fn only_host_attendance_satisfies_the_policy(
        frank: Account,
        #[case] host_flag: Option<bool>,
        #[case] allowed: bool,
    ) {
        let activity_id = ActivityId::random();
        let key = AttendanceKey::new(frank.id(), activity_id);
        let attendance = host_flag.map(|host| {
            if host {
                Attendance::host(key, Utc::now())
            } else {
                Attendance::attendee(key, Utc::now())
            }
        });
        let who = caller(&frank);
        let mut uow = MockUnitOfWork::new();
        uow.expect_find_account()
            .return_once(move |_| Ok(Some(frank)));
        uow.expect_find_attendance()
            .withf(move |k| *k == key)
            .return_once(move |_| Ok(attendance));

        let result = IsActivityHost::new(factory_with(uow))
            .authorize(&who, &activity_id)
            .await;

        if allowed {
            assert!(result.is_ok());
        } else {
            assert!(matches!(
                result,
                Err(DispatchError::Denied(PolicyDenial::NotHost { .. }))
            ));
        }
    }

    #[rstest]
    #[tokio::test]
    async fn anonymous_callers_are_denied_without_lookups() {
        let factory = Arc::new(MockUnitOfWorkFactory::new());
        let result = IsActivityHost::new(factory)
            .authorize(&Caller::Anonymous, &ActivityId::random())
            .await;
        assert_eq!(result, Err(DispatchError::Denied(PolicyDenial::Anonymous)));
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_accounts_are_denied(frank: Account) {
        let who = caller(&frank);
        let mut uow = MockUnitOfWork::new();
        uow.expect_find_account().return_once(|_| Ok(None));
        let result = IsActivityHost::new(factory_with(uow))
            .authorize(&who, &ActivityId::random())
            .await;
        assert!(matches!(result, Err(DispatchError::Denied(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn lookup_failures_are_not_denials(frank: Account) {
        let who = caller(&frank);
        let mut uow = MockUnitOfWork::new();
        uow.expect_find_account()
            .return_once(|_| Err(PersistenceError::query("timeout")));
        let result = IsActivityHost::new(factory_with(uow))
            .authorize(&who, &ActivityId::random())
            .await;
        match result {
            Err(DispatchError::Failed(err)) => assert_eq!(err.code(), ErrorCode::InternalError),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
