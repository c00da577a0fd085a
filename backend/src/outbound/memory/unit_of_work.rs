//! In-memory [`UnitOfWork`] with staged, all-or-nothing commits.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{PersistenceError, UniqueConstraint, UnitOfWork, UnitOfWorkFactory};
use crate::domain::{Account, Activity, ActivityId, Attendance, AttendanceKey, Email, Username};

use super::store::{InMemoryStore, StoreState};

#[derive(Debug, Clone)]
enum Staged {
    AddActivity(Activity),
    UpdateActivity(Activity),
    RemoveActivity(ActivityId),
    AddAttendance(Attendance),
    RemoveAttendance(AttendanceKey),
    UpdateAccount(Account),
}

impl Staged {
    /// Apply one mutation and return the rows it touched.
    fn apply(self, state: &mut StoreState) -> Result<usize, PersistenceError> {
        match self {
            Self::AddActivity(activity) => {
                if state.activities.contains_key(&activity.id()) {
                    return Err(PersistenceError::unique_violation(
                        UniqueConstraint::ActivityId,
                    ));
                }
                state.activities.insert(activity.id(), activity);
                Ok(1)
            }
            Self::UpdateActivity(activity) => match state.activities.get_mut(&activity.id()) {
                Some(stored) => {
                    *stored = activity;
                    Ok(1)
                }
                None => Ok(0),
            },
            Self::RemoveActivity(id) => {
                if state.activities.remove(&id).is_none() {
                    return Ok(0);
                }
                let before = state.attendance.len();
                state.attendance.retain(|key, _| key.activity_id != id);
                Ok(1 + before - state.attendance.len())
            }
            Self::AddAttendance(attendance) => {
                let key = attendance.key();
                if state.attendance.contains_key(&key) {
                    return Err(PersistenceError::unique_violation(
                        UniqueConstraint::Attendance,
                    ));
                }
                if !state.activities.contains_key(&key.activity_id) {
                    return Err(PersistenceError::query(format!(
                        "attendance references unknown activity {}",
                        key.activity_id
                    )));
                }
                if !state.accounts.contains_key(&key.account_id) {
                    return Err(PersistenceError::query(format!(
                        "attendance references unknown account {}",
                        key.account_id
                    )));
                }
                state.attendance.insert(key, attendance);
                Ok(1)
            }
            Self::RemoveAttendance(key) => Ok(usize::from(state.attendance.remove(&key).is_some())),
            Self::UpdateAccount(account) => match state.accounts.get_mut(&account.id()) {
                Some(stored) if stored.version() != account.version() => {
                    Err(PersistenceError::stale_write(format!(
                        "account {}",
                        account.username()
                    )))
                }
                Some(stored) => {
                    let version = stored.version() + 1;
                    *stored = account.with_version(version);
                    Ok(1)
                }
                None => Ok(0),
            },
        }
    }
}

/// Unit of work over an [`InMemoryStore`].
///
/// Reads go straight to the committed tables. Writes are buffered until
/// [`UnitOfWork::commit`], which applies them to a copy of the tables and
/// swaps the copy in only when every mutation succeeded.
pub struct InMemoryUnitOfWork {
    store: InMemoryStore,
    staged: Vec<Staged>,
}

impl InMemoryUnitOfWork {
    pub fn new(store: InMemoryStore) -> Self {
        Self {
            store,
            staged: Vec::new(),
        }
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn find_activity(&self, id: &ActivityId) -> Result<Option<Activity>, PersistenceError> {
        Ok(self.store.lock()?.activities.get(id).cloned())
    }

    async fn list_activities(&self) -> Result<Vec<Activity>, PersistenceError> {
        let state = self.store.lock()?;
        let mut activities: Vec<Activity> = state.activities.values().cloned().collect();
        activities.sort_by_key(|activity| activity.details().date());
        Ok(activities)
    }

    async fn find_account(
        &self,
        username: &Username,
    ) -> Result<Option<Account>, PersistenceError> {
        Ok(self.store.lock()?.account_by_username(username).cloned())
    }

    async fn email_exists(&self, email: &Email) -> Result<bool, PersistenceError> {
        Ok(self.store.lock()?.account_by_email(email).is_some())
    }

    async fn username_exists(&self, username: &Username) -> Result<bool, PersistenceError> {
        Ok(self.store.lock()?.account_by_username(username).is_some())
    }

    async fn find_attendance(
        &self,
        key: &AttendanceKey,
    ) -> Result<Option<Attendance>, PersistenceError> {
        Ok(self.store.lock()?.attendance.get(key).cloned())
    }

    async fn attendees(
        &self,
        activity_id: &ActivityId,
    ) -> Result<Vec<(Attendance, Account)>, PersistenceError> {
        let state = self.store.lock()?;
        state
            .attendance
            .values()
            .filter(|attendance| attendance.key().activity_id == *activity_id)
            .map(|attendance| {
                let account_id = attendance.key().account_id;
                state
                    .accounts
                    .get(&account_id)
                    .map(|account| (attendance.clone(), account.clone()))
                    .ok_or_else(|| {
                        PersistenceError::query(format!(
                            "attendance references unknown account {account_id}"
                        ))
                    })
            })
            .collect()
    }

    fn add_activity(&mut self, activity: Activity) {
        self.staged.push(Staged::AddActivity(activity));
    }

    fn update_activity(&mut self, activity: Activity) {
        self.staged.push(Staged::UpdateActivity(activity));
    }

    fn remove_activity(&mut self, id: ActivityId) {
        self.staged.push(Staged::RemoveActivity(id));
    }

    fn add_attendance(&mut self, attendance: Attendance) {
        self.staged.push(Staged::AddAttendance(attendance));
    }

    fn remove_attendance(&mut self, key: AttendanceKey) {
        self.staged.push(Staged::RemoveAttendance(key));
    }

    fn update_account(&mut self, account: Account) {
        self.staged.push(Staged::UpdateAccount(account));
    }

    async fn commit(&mut self) -> Result<usize, PersistenceError> {
        let staged = std::mem::take(&mut self.staged);
        let mut state = self.store.lock()?;
        let mut next = state.clone();
        let mut rows = 0;
        for mutation in staged {
            rows += mutation.apply(&mut next)?;
        }
        *state = next;
        debug!(rows, "in-memory commit applied");
        Ok(rows)
    }
}

#[async_trait]
impl UnitOfWorkFactory for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, PersistenceError> {
        Ok(Box::new(InMemoryUnitOfWork::new(self.clone())))
    }
}
