//! Domain primitives, aggregates, ports, and request handlers.
//!
//! Purpose: define the strongly typed entities of the activities app and
//! the handlers that enforce their invariants. Transport, storage, and
//! token cryptography stay behind the ports in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure with field detail.
//! - Account, Activity, Attendance, Photo: aggregates and their ids.
//! - Profile, ActivityView: read projections.
//! - dispatch: request pipeline, mediator, and handler contract.
//! - handlers: one service per area, implementing the request handlers.

pub mod account;
pub mod activity;
pub mod attendance;
pub mod auth;
pub mod authorization;
pub mod caller;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod photo;
pub mod ports;
pub mod profile;
pub mod trace_id;

pub use self::account::{
    Account, AccountId, AccountValidationError, DisplayName, Email, MainPhotoChange,
    PhotoRemovalError, Username,
};
pub use self::activity::{
    Activity, ActivityDetails, ActivityId, ActivityPatch, ActivityValidationError,
};
pub use self::attendance::{Attendance, AttendanceKey, AttendanceState};
pub use self::auth::{
    AccessToken, LoginCredentials, Password, PasswordPolicy, PasswordPolicyError, PasswordRule,
    SessionUser,
};
pub use self::authorization::{ActivityHostPolicy, IsActivityHost, PolicyDenial};
pub use self::caller::Caller;
pub use self::dispatch::{DispatchError, RequestContext, RequestPipeline};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::photo::{Photo, PhotoId, PhotoValidationError, StoredPhoto};
pub use self::profile::{ActivityView, AttendeeView, Profile};
pub use self::trace_id::TraceId;
