//! Shared fixtures for handler unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::dispatch::RequestContext;
use crate::domain::ports::{MockUnitOfWork, MockUnitOfWorkFactory, UnitOfWork};
use crate::domain::{Account, AccountId, DisplayName, Email, Username};

pub(super) fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        fixture_now().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        fixture_now()
    }
}

pub(super) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock)
}

pub(super) fn account(username: &str) -> Account {
    Account::new(
        AccountId::random(),
        Username::new(username).expect("username"),
        Email::new(format!("{username}@example.com")).expect("email"),
        DisplayName::new(username.to_uppercase()).expect("display name"),
    )
}

pub(super) fn context_for(account: &Account) -> RequestContext {
    RequestContext::for_user(account.username().clone())
}

/// Factory that hands out `uow` exactly once.
pub(super) fn factory_with(uow: MockUnitOfWork) -> Arc<MockUnitOfWorkFactory> {
    let mut factory = MockUnitOfWorkFactory::new();
    factory
        .expect_begin()
        .times(1)
        .return_once(move || Ok(Box::new(uow) as Box<dyn UnitOfWork>));
    Arc::new(factory)
}

/// Expect the caller lookup to return `account`.
pub(super) fn expect_caller(uow: &mut MockUnitOfWork, account: &Account) {
    let account = account.clone();
    uow.expect_find_account()
        .times(1)
        .return_once(move |_| Ok(Some(account)));
}
