//! Photo storage collaborator. Encoding, resizing, and hosting belong to
//! the adapter; the domain only sees the assigned id and public URL.

use std::fmt;

use async_trait::async_trait;

use crate::domain::{PhotoId, StoredPhoto};

use super::define_port_error;

define_port_error! {
    /// Errors raised by photo storage adapters.
    pub enum PhotoStorageError {
        /// The upload payload was refused.
        Rejected { message: String } => "photo upload rejected: {message}",
        /// The storage service could not be reached.
        Unavailable { message: String } => "photo storage unavailable: {message}",
    }
}

/// Raw image payload received from the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Stores uploaded images outside the database.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Store the image and return its assigned id and URL.
    async fn upload(&self, image: ImageUpload) -> Result<StoredPhoto, PhotoStorageError>;

    /// Delete a stored image. `Ok(false)` means the storage did not delete it.
    async fn delete(&self, id: &PhotoId) -> Result<bool, PhotoStorageError>;
}
