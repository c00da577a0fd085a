//! Attendance: the join between an account and an activity.
//!
//! Per (account, activity) pair an attendance moves through
//! [`AttendanceState`]:
//!
//! ```text
//! Absent --attend--> Attending { host: false } --unattend--> Absent
//! Absent --create activity--> Attending { host: true }   (no way back)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountId, ActivityId};

/// Composite key; at most one attendance exists per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceKey {
    pub account_id: AccountId,
    pub activity_id: ActivityId,
}

impl AttendanceKey {
    pub fn new(account_id: AccountId, activity_id: ActivityId) -> Self {
        Self {
            account_id,
            activity_id,
        }
    }
}

/// An account's participation in an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    key: AttendanceKey,
    is_host: bool,
    joined_at: DateTime<Utc>,
}

impl Attendance {
    /// Attendance of the account that created the activity.
    pub fn host(key: AttendanceKey, joined_at: DateTime<Utc>) -> Self {
        Self {
            key,
            is_host: true,
            joined_at,
        }
    }

    /// Attendance of an account that joined someone else's activity.
    pub fn attendee(key: AttendanceKey, joined_at: DateTime<Utc>) -> Self {
        Self {
            key,
            is_host: false,
            joined_at,
        }
    }

    pub fn key(&self) -> AttendanceKey {
        self.key
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }

    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }
}

/// Lifecycle state of one (account, activity) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceState {
    Absent,
    Attending { host: bool },
}

impl From<Option<&Attendance>> for AttendanceState {
    fn from(value: Option<&Attendance>) -> Self {
        match value {
            None => Self::Absent,
            Some(attendance) => Self::Attending {
                host: attendance.is_host(),
            },
        }
    }
}
