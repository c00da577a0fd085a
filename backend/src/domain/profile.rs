//! Read-only projections assembled from account, photo, and attendance state.

use serde::Serialize;

use super::{Account, Activity, Attendance, Photo};

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub photos: Vec<Photo>,
}

impl From<&Account> for Profile {
    fn from(account: &Account) -> Self {
        Self {
            username: account.username().to_string(),
            display_name: account.display_name().to_string(),
            bio: account.bio().map(str::to_owned),
            image: account.image_url().map(str::to_owned),
            photos: account.photos().to_vec(),
        }
    }
}

/// One attendee as listed on an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeView {
    pub username: String,
    pub display_name: String,
    pub image: Option<String>,
    pub is_host: bool,
}

impl AttendeeView {
    pub fn new(attendance: &Attendance, account: &Account) -> Self {
        Self {
            username: account.username().to_string(),
            display_name: account.display_name().to_string(),
            image: account.image_url().map(str::to_owned),
            is_host: attendance.is_host(),
        }
    }
}

/// An activity together with everyone attending it, host first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
    #[serde(flatten)]
    pub activity: Activity,
    pub attendees: Vec<AttendeeView>,
}

impl ActivityView {
    /// Build the view, ordering the host first and then by join time.
    pub fn new(activity: Activity, mut attendees: Vec<(Attendance, Account)>) -> Self {
        attendees.sort_by(|(a, _), (b, _)| {
            b.is_host()
                .cmp(&a.is_host())
                .then(a.joined_at().cmp(&b.joined_at()))
        });
        let attendees = attendees
            .iter()
            .map(|(attendance, account)| AttendeeView::new(attendance, account))
            .collect();
        Self {
            activity,
            attendees,
        }
    }

    /// Username of the activity's host, when the host row is present.
    pub fn host_username(&self) -> Option<&str> {
        self.attendees
            .iter()
            .find(|attendee| attendee.is_host)
            .map(|attendee| attendee.username.as_str())
    }
}
