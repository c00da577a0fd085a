//! Persistence gateway scoped to one request.
//!
//! Handlers open a [`UnitOfWork`] through the [`UnitOfWorkFactory`], read
//! committed state, stage mutations, and finish with a single
//! [`UnitOfWork::commit`] that applies every staged change or none of them.
//! The commit reports how many rows it touched; handlers treat zero as a
//! failed save.

use std::fmt;

use async_trait::async_trait;

use crate::domain::{Account, Activity, ActivityId, Attendance, AttendanceKey, Email, Username};

use super::define_port_error;

/// Storage-level unique constraints backing the check-then-act rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueConstraint {
    /// One activity per identifier.
    ActivityId,
    /// One attendance per (account, activity) pair.
    Attendance,
    /// One account per email address.
    AccountEmail,
    /// One account per username, compared case-insensitively.
    AccountUsername,
}

impl fmt::Display for UniqueConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ActivityId => "activity_id",
            Self::Attendance => "attendance",
            Self::AccountEmail => "account_email",
            Self::AccountUsername => "account_username",
        };
        f.write_str(name)
    }
}

define_port_error! {
    /// Errors raised by persistence adapters.
    pub enum PersistenceError {
        /// The backing store could not be reached.
        Connection { message: String } => "persistence connection failed: {message}",
        /// A read or write failed during execution.
        Query { message: String } => "persistence query failed: {message}",
        /// A commit was rejected by a unique constraint.
        UniqueViolation { constraint: UniqueConstraint } =>
            "unique constraint violated: {constraint}",
        /// A staged update was read before a concurrent commit changed the row.
        StaleWrite { entity: String } => "stale write rejected for {entity}",
    }
}

/// One request's view of durable state.
///
/// Reads observe committed state only; staged mutations become visible
/// after [`UnitOfWork::commit`] succeeds. Dropping a unit of work without
/// committing discards everything it staged.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    async fn find_activity(&self, id: &ActivityId) -> Result<Option<Activity>, PersistenceError>;

    /// All activities ordered by date, earliest first.
    async fn list_activities(&self) -> Result<Vec<Activity>, PersistenceError>;

    /// Look up an account by username, ignoring case.
    async fn find_account(&self, username: &Username)
    -> Result<Option<Account>, PersistenceError>;

    async fn email_exists(&self, email: &Email) -> Result<bool, PersistenceError>;

    async fn username_exists(&self, username: &Username) -> Result<bool, PersistenceError>;

    async fn find_attendance(
        &self,
        key: &AttendanceKey,
    ) -> Result<Option<Attendance>, PersistenceError>;

    /// Every attendance of an activity paired with the attending account.
    async fn attendees(
        &self,
        activity_id: &ActivityId,
    ) -> Result<Vec<(Attendance, Account)>, PersistenceError>;

    fn add_activity(&mut self, activity: Activity);

    fn update_activity(&mut self, activity: Activity);

    /// Stage removal of an activity together with its attendance rows.
    fn remove_activity(&mut self, id: ActivityId);

    fn add_attendance(&mut self, attendance: Attendance);

    fn remove_attendance(&mut self, key: AttendanceKey);

    /// Stage the account's current state, photo collection included.
    ///
    /// The commit fails with [`PersistenceError::StaleWrite`] when the
    /// stored account moved past [`Account::version`] since it was read.
    fn update_account(&mut self, account: Account);

    /// Apply every staged mutation atomically and report rows affected.
    async fn commit(&mut self) -> Result<usize, PersistenceError>;
}

/// Opens a fresh [`UnitOfWork`] per request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, PersistenceError>;
}
