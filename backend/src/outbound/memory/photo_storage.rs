//! In-memory [`PhotoStorage`] that keeps uploaded bytes keyed by id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{ImageUpload, PhotoStorage, PhotoStorageError};
use crate::domain::{PhotoId, StoredPhoto};

/// Photo storage serving images under `base_url`.
#[derive(Debug, Clone)]
pub struct InMemoryPhotoStorage {
    base_url: String,
    images: Arc<Mutex<HashMap<PhotoId, ImageUpload>>>,
}

impl InMemoryPhotoStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            images: Arc::default(),
        }
    }

    /// Whether an image with `id` is currently stored.
    pub fn contains(&self, id: &PhotoId) -> bool {
        self.images
            .lock()
            .is_ok_and(|images| images.contains_key(id))
    }
}

fn poisoned() -> PhotoStorageError {
    PhotoStorageError::unavailable("in-memory photo storage lock poisoned")
}

#[async_trait]
impl PhotoStorage for InMemoryPhotoStorage {
    async fn upload(&self, image: ImageUpload) -> Result<StoredPhoto, PhotoStorageError> {
        if image.bytes.is_empty() {
            return Err(PhotoStorageError::rejected("image is empty"));
        }
        if !image.content_type.starts_with("image/") {
            return Err(PhotoStorageError::rejected(format!(
                "unsupported content type {}",
                image.content_type
            )));
        }
        let id = PhotoId::new(Uuid::new_v4().simple().to_string())
            .map_err(|err| PhotoStorageError::rejected(err.to_string()))?;
        let url = format!("{}/{id}", self.base_url);
        debug!(%id, file_name = %image.file_name, "photo stored");
        self.images
            .lock()
            .map_err(|_| poisoned())?
            .insert(id.clone(), image);
        Ok(StoredPhoto { id, url })
    }

    async fn delete(&self, id: &PhotoId) -> Result<bool, PhotoStorageError> {
        let removed = self.images.lock().map_err(|_| poisoned())?.remove(id);
        Ok(removed.is_some())
    }
}
