//! Activity lifecycle: create with host, edit, delete, and read views.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::{activity_not_found, begin, commit, conflict_for, persistence_error};
use crate::domain::dispatch::{Request, RequestContext, RequestHandler};
use crate::domain::ports::{UniqueConstraint, UnitOfWork, UnitOfWorkFactory};
use crate::domain::{
    Activity, ActivityDetails, ActivityId, ActivityPatch, ActivityView, Attendance, AttendanceKey,
    Error,
};

/// Create an activity; the caller becomes its host in the same commit.
#[derive(Debug, Clone)]
pub struct CreateActivity {
    pub id: ActivityId,
    pub details: ActivityDetails,
}

impl Request for CreateActivity {
    type Response = ();
    const NAME: &'static str = "create_activity";
}

/// Overwrite the supplied fields of an activity. Host only.
#[derive(Debug, Clone)]
pub struct EditActivity {
    pub id: ActivityId,
    pub patch: ActivityPatch,
}

impl Request for EditActivity {
    type Response = ();
    const NAME: &'static str = "edit_activity";

    fn host_activity(&self) -> Option<ActivityId> {
        Some(self.id)
    }
}

/// Remove an activity and every attendance on it. Host only.
#[derive(Debug, Clone)]
pub struct DeleteActivity {
    pub id: ActivityId,
}

impl Request for DeleteActivity {
    type Response = ();
    const NAME: &'static str = "delete_activity";

    fn host_activity(&self) -> Option<ActivityId> {
        Some(self.id)
    }
}

/// Every activity, earliest first, with its attendees.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListActivities;

impl Request for ListActivities {
    type Response = Vec<ActivityView>;
    const NAME: &'static str = "list_activities";
}

/// One activity with its attendees.
#[derive(Debug, Clone, Copy)]
pub struct GetActivity {
    pub id: ActivityId,
}

impl Request for GetActivity {
    type Response = ActivityView;
    const NAME: &'static str = "get_activity";
}

/// Handlers for activity requests.
pub struct ActivityService<F> {
    uow: Arc<F>,
    clock: Arc<dyn Clock>,
}

impl<F> ActivityService<F> {
    pub fn new(uow: Arc<F>, clock: Arc<dyn Clock>) -> Self {
        Self { uow, clock }
    }
}

impl<F> ActivityService<F>
where
    F: UnitOfWorkFactory,
{
    async fn load(uow: &dyn UnitOfWork, id: &ActivityId) -> Result<Activity, Error> {
        uow.find_activity(id)
            .await
            .map_err(persistence_error)?
            .ok_or_else(|| activity_not_found(id))
    }

    async fn view(uow: &dyn UnitOfWork, activity: Activity) -> Result<ActivityView, Error> {
        let attendees = uow
            .attendees(&activity.id())
            .await
            .map_err(persistence_error)?;
        Ok(ActivityView::new(activity, attendees))
    }
}

#[async_trait]
impl<F> RequestHandler<CreateActivity> for ActivityService<F>
where
    F: UnitOfWorkFactory,
{
    async fn handle(&self, context: &RequestContext, request: CreateActivity) -> Result<(), Error> {
        let mut uow = begin(self.uow.as_ref()).await?;
        let host = context.caller.account(uow.as_ref()).await?;
        let id = request.id;

        let existing = uow.find_activity(&id).await.map_err(persistence_error)?;
        if existing.is_some() {
            warn!(activity_id = %id, "activity id already in use");
            return Err(conflict_for(UniqueConstraint::ActivityId));
        }

        uow.add_activity(Activity::new(id, request.details));
        uow.add_attendance(Attendance::host(
            AttendanceKey::new(host.id(), id),
            self.clock.utc(),
        ));
        commit(uow.as_mut(), "create activity").await?;
        info!(activity_id = %id, host = %host.username(), "activity created");
        Ok(())
    }
}

#[async_trait]
impl<F> RequestHandler<EditActivity> for ActivityService<F>
where
    F: UnitOfWorkFactory,
{
    async fn handle(&self, _context: &RequestContext, request: EditActivity) -> Result<(), Error> {
        let mut uow = begin(self.uow.as_ref()).await?;
        let mut activity = Self::load(uow.as_ref(), &request.id).await?;
        activity.apply(&request.patch);
        uow.update_activity(activity);
        commit(uow.as_mut(), "edit activity").await?;
        info!(activity_id = %request.id, "activity edited");
        Ok(())
    }
}

#[async_trait]
impl<F> RequestHandler<DeleteActivity> for ActivityService<F>
where
    F: UnitOfWorkFactory,
{
    async fn handle(
        &self,
        _context: &RequestContext,
        request: DeleteActivity,
    ) -> Result<(), Error> {
        let mut uow = begin(self.uow.as_ref()).await?;
        let activity = Self::load(uow.as_ref(), &request.id).await?;
        uow.remove_activity(activity.id());
        let rows = commit(uow.as_mut(), "delete activity").await?;
        info!(activity_id = %request.id, rows, "activity deleted");
        Ok(())
    }
}

#[async_trait]
impl<F> RequestHandler<ListActivities> for ActivityService<F>
where
    F: UnitOfWorkFactory,
{
    async fn handle(
        &self,
        context: &RequestContext,
        _request: ListActivities,
    ) -> Result<Vec<ActivityView>, Error> {
        context.caller.username()?;
        let uow = begin(self.uow.as_ref()).await?;
        let activities = uow.list_activities().await.map_err(persistence_error)?;
        let mut views = Vec::with_capacity(activities.len());
        for activity in activities {
            views.push(Self::view(uow.as_ref(), activity).await?);
        }
        Ok(views)
    }
}

#[async_trait]
impl<F> RequestHandler<GetActivity> for ActivityService<F>
where
    F: UnitOfWorkFactory,
{
    async fn handle(
        &self,
        context: &RequestContext,
        request: GetActivity,
    ) -> Result<ActivityView, Error> {
        context.caller.username()?;
        let uow = begin(self.uow.as_ref()).await?;
        let activity = Self::load(uow.as_ref(), &request.id).await?;
        Self::view(uow.as_ref(), activity).await
    }
}
