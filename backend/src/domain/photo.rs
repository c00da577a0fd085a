//! Profile photos owned by an account.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors for photo identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhotoValidationError {
    #[error("photo id must not be empty")]
    EmptyId,
}

/// Identifier assigned by the photo storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhotoId(String);

impl PhotoId {
    /// Validate and construct a [`PhotoId`].
    pub fn new(id: impl Into<String>) -> Result<Self, PhotoValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(PhotoValidationError::EmptyId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for PhotoId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PhotoId> for String {
    fn from(value: PhotoId) -> Self {
        value.0
    }
}

impl TryFrom<String> for PhotoId {
    type Error = PhotoValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Result of a successful upload: where the image lives and its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhoto {
    pub id: PhotoId,
    pub url: String,
}

/// Photo attached to an account.
///
/// The main flag is only changed through the owning
/// [`Account`](super::Account).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    id: PhotoId,
    url: String,
    is_main: bool,
}

impl Photo {
    /// Rehydrate a photo row.
    pub fn new(id: PhotoId, url: impl Into<String>, is_main: bool) -> Self {
        Self {
            id,
            url: url.into(),
            is_main,
        }
    }

    pub(crate) fn from_stored(stored: StoredPhoto, is_main: bool) -> Self {
        let StoredPhoto { id, url } = stored;
        Self { id, url, is_main }
    }

    pub fn id(&self) -> &PhotoId {
        &self.id
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn is_main(&self) -> bool {
        self.is_main
    }

    pub(crate) fn set_main(&mut self, is_main: bool) {
        self.is_main = is_main;
    }
}
