//! Shared state behind the in-memory adapters.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::ports::PersistenceError;
use crate::domain::{
    Account, AccountId, Activity, ActivityId, Attendance, AttendanceKey, Email, Username,
};

/// Salted password digest kept beside each account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Credential {
    pub(super) salt: String,
    pub(super) digest: String,
}

/// Tables of the in-memory store. Cloned wholesale when a unit of work
/// commits so a failed commit leaves the live copy untouched.
#[derive(Debug, Clone, Default)]
pub(super) struct StoreState {
    pub(super) activities: BTreeMap<ActivityId, Activity>,
    pub(super) attendance: BTreeMap<AttendanceKey, Attendance>,
    pub(super) accounts: BTreeMap<AccountId, Account>,
    pub(super) credentials: HashMap<AccountId, Credential>,
}

impl StoreState {
    pub(super) fn account_by_username(&self, username: &Username) -> Option<&Account> {
        let wanted = username.normalized();
        self.accounts
            .values()
            .find(|account| account.username().normalized() == wanted)
    }

    pub(super) fn account_by_email(&self, email: &Email) -> Option<&Account> {
        self.accounts
            .values()
            .find(|account| account.email() == email)
    }
}

/// Process-local store shared by the unit of work, identity, and photo
/// adapters. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn lock(&self) -> Result<MutexGuard<'_, StoreState>, PersistenceError> {
        self.state
            .lock()
            .map_err(|_| PersistenceError::connection("in-memory store lock poisoned"))
    }

    /// Number of stored activities.
    pub fn activity_count(&self) -> Result<usize, PersistenceError> {
        Ok(self.lock()?.activities.len())
    }

    /// Number of stored attendance rows.
    pub fn attendance_count(&self) -> Result<usize, PersistenceError> {
        Ok(self.lock()?.attendance.len())
    }
}
