//! Joining and leaving activities.
//!
//! The duplicate-attendance check here is check-then-act; the store's
//! unique constraint on the (account, activity) pair rejects the losing
//! writer of a race, and that rejection surfaces as the same conflict.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use super::{activity_not_found, begin, commit, conflict_for, persistence_error};
use crate::domain::dispatch::{Request, RequestContext, RequestHandler};
use crate::domain::ports::{UniqueConstraint, UnitOfWork, UnitOfWorkFactory};
use crate::domain::{ActivityId, Attendance, AttendanceKey, AttendanceState, Error};

/// Join an activity as a regular attendee.
#[derive(Debug, Clone, Copy)]
pub struct AttendActivity {
    pub id: ActivityId,
}

impl Request for AttendActivity {
    type Response = ();
    const NAME: &'static str = "attend_activity";
}

/// Leave an activity. Leaving one you do not attend succeeds.
#[derive(Debug, Clone, Copy)]
pub struct UnattendActivity {
    pub id: ActivityId,
}

impl Request for UnattendActivity {
    type Response = ();
    const NAME: &'static str = "unattend_activity";
}

/// Handles joining and leaving activities.
pub struct AttendanceService<F> {
    uow: Arc<F>,
    clock: Arc<dyn Clock>,
}

impl<F> AttendanceService<F> {
    pub fn new(uow: Arc<F>, clock: Arc<dyn Clock>) -> Self {
        Self { uow, clock }
    }
}

async fn ensure_activity(uow: &dyn UnitOfWork, id: &ActivityId) -> Result<(), Error> {
    match uow.find_activity(id).await.map_err(persistence_error)? {
        Some(_) => Ok(()),
        None => Err(activity_not_found(id)),
    }
}

#[async_trait]
impl<F> RequestHandler<AttendActivity> for AttendanceService<F>
where
    F: UnitOfWorkFactory,
{
    async fn handle(&self, context: &RequestContext, request: AttendActivity) -> Result<(), Error> {
        let mut uow = begin(self.uow.as_ref()).await?;
        ensure_activity(uow.as_ref(), &request.id).await?;
        let account = context.caller.account(uow.as_ref()).await?;
        let key = AttendanceKey::new(account.id(), request.id);

        let existing = uow.find_attendance(&key).await.map_err(persistence_error)?;
        if let AttendanceState::Attending { .. } = AttendanceState::from(existing.as_ref()) {
            warn!(activity_id = %request.id, username = %account.username(), "already attending");
            return Err(conflict_for(UniqueConstraint::Attendance));
        }

        uow.add_attendance(Attendance::attendee(key, self.clock.utc()));
        commit(uow.as_mut(), "attend activity").await?;
        info!(activity_id = %request.id, username = %account.username(), "attendance added");
        Ok(())
    }
}

#[async_trait]
impl<F> RequestHandler<UnattendActivity> for AttendanceService<F>
where
    F: UnitOfWorkFactory,
{
    async fn handle(
        &self,
        context: &RequestContext,
        request: UnattendActivity,
    ) -> Result<(), Error> {
        let mut uow = begin(self.uow.as_ref()).await?;
        ensure_activity(uow.as_ref(), &request.id).await?;
        let account = context.caller.account(uow.as_ref()).await?;
        let key = AttendanceKey::new(account.id(), request.id);

        let existing = uow.find_attendance(&key).await.map_err(persistence_error)?;
        match AttendanceState::from(existing.as_ref()) {
            AttendanceState::Absent => {
                debug!(
                    activity_id = %request.id,
                    username = %account.username(),
                    "not attending; nothing to leave"
                );
                Ok(())
            }
            AttendanceState::Attending { host: true } => {
                warn!(
                    activity_id = %request.id,
                    username = %account.username(),
                    "host tried to leave"
                );
                let message = "host cannot remove themselves from the activity";
                Err(Error::conflict(message).with_field("attendance", message))
            }
            AttendanceState::Attending { host: false } => {
                uow.remove_attendance(key);
                commit(uow.as_mut(), "unattend activity").await?;
                info!(
                    activity_id = %request.id,
                    username = %account.username(),
                    "attendance removed"
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::handlers::test_support::{
        account, context_for, expect_caller, factory_with, fixture_clock, fixture_now,
    };
    use crate::domain::ports::{MockUnitOfWork, MockUnitOfWorkFactory, PersistenceError};
    use crate::domain::{Activity, ActivityDetails};
    use rstest::rstest;

    fn activity(id: ActivityId) -> Activity {
        let details = ActivityDetails::try_new(
            "Climbing",
            "Bouldering session",
            "sport",
            fixture_now(),
            "Sheffield",
            "The Foundry",
        )
        .expect("valid details");
        Activity::new(id, details)
    }

    fn service(uow: MockUnitOfWork) -> AttendanceService<MockUnitOfWorkFactory> {
        AttendanceService::new(factory_with(uow), fixture_clock())
    }

    fn with_activity(uow: &mut MockUnitOfWork, id: ActivityId) {
        uow.expect_find_activity()
            .times(1)
            .return_once(move |_| Ok(Some(activity(id))));
    }

    #[rstest]
    #[tokio::test]
    async fn attend_adds_a_non_host_attendance() {
        let bob = account("bob");
        let id = ActivityId::random();
        let key = AttendanceKey::new(bob.id(), id);
        let mut uow = MockUnitOfWork::new();
        with_activity(&mut uow, id);
        expect_caller(&mut uow, &bob);
        uow.expect_find_attendance().times(1).return_once(|_| Ok(None));
        uow.expect_add_attendance()
            .withf(move |attendance| {
                attendance.key() == key
                    && !attendance.is_host()
                    && attendance.joined_at() == fixture_now()
            })
            .times(1)
            .return_const(());
        uow.expect_commit().times(1).return_once(|| Ok(1));

        service(uow)
            .handle(&context_for(&bob), AttendActivity { id })
            .await
            .expect("attend succeeds");
    }

    #[rstest]
    #[case::attendee(false)]
    #[case::host(true)]
    #[tokio::test]
    async fn attend_twice_is_a_conflict(#[case] host: bool) {
        let bob = account("bob");
        let id = ActivityId::random();
        let key = AttendanceKey::new(bob.id(), id);
        let existing = if host {
            Attendance::host(key, fixture_now())
        } else {
            Attendance::attendee(key, fixture_now())
        };
        let mut uow = MockUnitOfWork::new();
        with_activity(&mut uow, id);
        expect_caller(&mut uow, &bob);
        uow.expect_find_attendance()
            .return_once(move |_| Ok(Some(existing)));
        uow.expect_add_attendance().never();
        uow.expect_commit().never();

        let err = service(uow)
            .handle(&context_for(&bob), AttendActivity { id })
            .await
            .expect_err("duplicate attendance");
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.field("attendance"), Some("already attending this activity"));
    }

    #[rstest]
    #[tokio::test]
    async fn attend_race_lost_in_storage_is_the_same_conflict() {
        let bob = account("bob");
        let id = ActivityId::random();
        let mut uow = MockUnitOfWork::new();
        with_activity(&mut uow, id);
        expect_caller(&mut uow, &bob);
        uow.expect_find_attendance().return_once(|_| Ok(None));
        uow.expect_add_attendance().return_const(());
        uow.expect_commit()
            .return_once(|| Err(PersistenceError::unique_violation(UniqueConstraint::Attendance)));

        let err = service(uow)
            .handle(&context_for(&bob), AttendActivity { id })
            .await
            .expect_err("storage backstop");
        assert_eq!(err, conflict_for(UniqueConstraint::Attendance));
    }

    #[rstest]
    #[tokio::test]
    async fn attend_unknown_activity_is_not_found() {
        let bob = account("bob");
        let mut uow = MockUnitOfWork::new();
        uow.expect_find_activity().return_once(|_| Ok(None));
        uow.expect_find_account().never();

        let err = service(uow)
            .handle(&context_for(&bob), AttendActivity {
                id: ActivityId::random(),
            })
            .await
            .expect_err("missing activity");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn unattend_without_attendance_is_a_no_op() {
        let bob = account("bob");
        let id = ActivityId::random();
        let mut uow = MockUnitOfWork::new();
        with_activity(&mut uow, id);
        expect_caller(&mut uow, &bob);
        uow.expect_find_attendance().return_once(|_| Ok(None));
        uow.expect_remove_attendance().never();
        uow.expect_commit().never();

        service(uow)
            .handle(&context_for(&bob), UnattendActivity { id })
            .await
            .expect("no-op succeeds");
    }

    #[rstest]
    #[tokio::test]
    async fn host_cannot_unattend() {
        let alice = account("alice");
        let id = ActivityId::random();
        let key = AttendanceKey::new(alice.id(), id);
        let mut uow = MockUnitOfWork::new();
        with_activity(&mut uow, id);
        expect_caller(&mut uow, &alice);
        uow.expect_find_attendance()
            .return_once(move |_| Ok(Some(Attendance::host(key, fixture_now()))));
        uow.expect_remove_attendance().never();
        uow.expect_commit().never();

        let err = service(uow)
            .handle(&context_for(&alice), UnattendActivity { id })
            .await
            .expect_err("host is blocked");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn attendee_unattend_removes_the_row() {
        let bob = account("bob");
        let id = ActivityId::random();
        let key = AttendanceKey::new(bob.id(), id);
        let mut uow = MockUnitOfWork::new();
        with_activity(&mut uow, id);
        expect_caller(&mut uow, &bob);
        uow.expect_find_attendance()
            .return_once(move |_| Ok(Some(Attendance::attendee(key, fixture_now()))));
        uow.expect_remove_attendance()
            .withf(move |removed| *removed == key)
            .times(1)
            .return_const(());
        uow.expect_commit().times(1).return_once(|| Ok(1));

        service(uow)
            .handle(&context_for(&bob), UnattendActivity { id })
            .await
            .expect("leave succeeds");
    }

    #[rstest]
    #[tokio::test]
    async fn unattend_fails_when_nothing_was_removed() {
        let bob = account("bob");
        let id = ActivityId::random();
        let key = AttendanceKey::new(bob.id(), id);
        let mut uow = MockUnitOfWork::new();
        with_activity(&mut uow, id);
        expect_caller(&mut uow, &bob);
        uow.expect_find_attendance()
            .return_once(move |_| Ok(Some(Attendance::attendee(key, fixture_now()))));
        uow.expect_remove_attendance().return_const(());
        uow.expect_commit().return_once(|| Ok(0));

        let err = service(uow)
            .handle(&context_for(&bob), UnattendActivity { id })
            .await
            .expect_err("zero rows");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
