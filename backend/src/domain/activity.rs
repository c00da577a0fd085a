//! Social activities that accounts host and attend.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Error;

/// Validation errors raised while building activity details.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActivityValidationError {
    /// A required text field was blank once trimmed.
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
}

impl From<ActivityValidationError> for Error {
    fn from(value: ActivityValidationError) -> Self {
        let message = value.to_string();
        match value {
            ActivityValidationError::EmptyField { field } => {
                Error::invalid_request(message.clone()).with_field(field, message)
            }
        }
    }
}

/// Caller-supplied, globally unique activity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(Uuid);

impl ActivityId {
    /// Generate a fresh identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn required(field: &'static str, value: String) -> Result<String, ActivityValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ActivityValidationError::EmptyField { field });
    }
    Ok(trimmed.to_owned())
}

/// Descriptive fields of an activity.
///
/// ## Invariants
/// - Every text field is non-empty once trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDetails {
    title: String,
    description: String,
    category: String,
    date: DateTime<Utc>,
    city: String,
    venue: String,
}

impl ActivityDetails {
    /// Validate the descriptive fields.
    pub fn try_new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        date: DateTime<Utc>,
        city: impl Into<String>,
        venue: impl Into<String>,
    ) -> Result<Self, ActivityValidationError> {
        Ok(Self {
            title: required("title", title.into())?,
            description: required("description", description.into())?,
            category: required("category", category.into())?,
            date,
            city: required("city", city.into())?,
            venue: required("venue", venue.into())?,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn venue(&self) -> &str {
        &self.venue
    }
}

/// Partial update of an activity's details.
///
/// Absent or blank text fields keep the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub city: Option<String>,
    pub venue: Option<String>,
}

fn overlay(target: &mut String, value: Option<&String>) {
    if let Some(value) = value.map(|v| v.trim()).filter(|v| !v.is_empty()) {
        *target = value.to_owned();
    }
}

impl ActivityPatch {
    /// Whether applying the patch could change anything.
    pub fn is_empty(&self) -> bool {
        let blank = |value: &Option<String>| value.as_deref().is_none_or(|v| v.trim().is_empty());
        blank(&self.title)
            && blank(&self.description)
            && blank(&self.category)
            && self.date.is_none()
            && blank(&self.city)
            && blank(&self.venue)
    }
}

/// A scheduled activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    id: ActivityId,
    #[serde(flatten)]
    details: ActivityDetails,
}

impl Activity {
    pub fn new(id: ActivityId, details: ActivityDetails) -> Self {
        Self { id, details }
    }

    pub fn id(&self) -> ActivityId {
        self.id
    }

    pub fn details(&self) -> &ActivityDetails {
        &self.details
    }

    /// Overlay the non-empty fields of `patch`.
    pub fn apply(&mut self, patch: &ActivityPatch) {
        let details = &mut self.details;
        overlay(&mut details.title, patch.title.as_ref());
        overlay(&mut details.description, patch.description.as_ref());
        overlay(&mut details.category, patch.category.as_ref());
        if let Some(date) = patch.date {
            details.date = date;
        }
        overlay(&mut details.city, patch.city.as_ref());
        overlay(&mut details.venue, patch.venue.as_ref());
    }
}
