//! Command and query handlers.
//!
//! Each service owns the handlers for one area and implements
//! [`RequestHandler`](super::dispatch::RequestHandler) once per request
//! type. Handlers open one unit of work, enforce the domain rules against
//! committed state, stage their writes, and commit once. A commit that
//! touches no rows is a failed save.

mod accounts;
mod activities;
mod attendance;
mod photos;
mod profiles;
#[cfg(test)]
mod test_support;

pub use accounts::{AccountService, CurrentUser, Login, RegisterAccount};
pub use activities::{
    ActivityService, CreateActivity, DeleteActivity, EditActivity, GetActivity, ListActivities,
};
pub use attendance::{AttendActivity, AttendanceService, UnattendActivity};
pub use photos::{AddPhoto, DeletePhoto, PhotoService, SetMainPhoto};
pub use profiles::{GetProfile, ProfileService, UpdateProfile};

use tracing::{error, warn};

use super::dispatch::RequestDescriptor;
use super::ports::{PersistenceError, UniqueConstraint, UnitOfWork, UnitOfWorkFactory};
use super::Error;

/// Every request type the application serves. The mediator refuses to
/// build unless each has a handler.
pub fn catalogue() -> Vec<RequestDescriptor> {
    vec![
        RequestDescriptor::of::<CreateActivity>(),
        RequestDescriptor::of::<EditActivity>(),
        RequestDescriptor::of::<DeleteActivity>(),
        RequestDescriptor::of::<ListActivities>(),
        RequestDescriptor::of::<GetActivity>(),
        RequestDescriptor::of::<AttendActivity>(),
        RequestDescriptor::of::<UnattendActivity>(),
        RequestDescriptor::of::<AddPhoto>(),
        RequestDescriptor::of::<DeletePhoto>(),
        RequestDescriptor::of::<SetMainPhoto>(),
        RequestDescriptor::of::<UpdateProfile>(),
        RequestDescriptor::of::<GetProfile>(),
        RequestDescriptor::of::<RegisterAccount>(),
        RequestDescriptor::of::<Login>(),
        RequestDescriptor::of::<CurrentUser>(),
    ]
}

/// The conflict reported for a broken uniqueness rule, whether the handler
/// caught it up front or the store rejected the commit.
pub(crate) fn conflict_for(constraint: UniqueConstraint) -> Error {
    let (field, message) = match constraint {
        UniqueConstraint::ActivityId => ("id", "activity already exists"),
        UniqueConstraint::Attendance => ("attendance", "already attending this activity"),
        UniqueConstraint::AccountEmail => ("email", "email already exists"),
        UniqueConstraint::AccountUsername => ("username", "username already exists"),
    };
    Error::conflict(message).with_field(field, message)
}

pub(crate) fn persistence_error(error: PersistenceError) -> Error {
    match error {
        PersistenceError::UniqueViolation { constraint } => {
            warn!(%constraint, "store rejected duplicate write");
            conflict_for(constraint)
        }
        PersistenceError::StaleWrite { entity } => {
            warn!(%entity, "store rejected stale write");
            Error::conflict(format!("{entity} was changed by another request"))
        }
        other => {
            error!(error = %other, kind = other.kind(), "persistence failure");
            Error::internal(other.to_string())
        }
    }
}

pub(crate) async fn begin<F>(factory: &F) -> Result<Box<dyn UnitOfWork>, Error>
where
    F: UnitOfWorkFactory + ?Sized,
{
    factory.begin().await.map_err(persistence_error)
}

/// Commit the unit of work; zero affected rows is a failed save.
pub(crate) async fn commit(uow: &mut dyn UnitOfWork, action: &'static str) -> Result<usize, Error> {
    let rows = uow.commit().await.map_err(persistence_error)?;
    if rows == 0 {
        error!(action, "commit affected no rows");
        return Err(Error::internal(format!("problem saving changes: {action}")));
    }
    Ok(rows)
}

pub(crate) fn activity_not_found(id: &super::ActivityId) -> Error {
    Error::not_found(format!("activity {id} not found")).with_field("id", "activity not found")
}
