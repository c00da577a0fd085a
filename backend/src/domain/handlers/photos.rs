//! The caller's photo album.
//!
//! Every change goes through [`Account`](crate::domain::Account) so the
//! main-photo rule holds when the account is staged for commit.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use super::{begin, commit};
use crate::domain::dispatch::{Request, RequestContext, RequestHandler};
use crate::domain::ports::{ImageUpload, PhotoStorage, PhotoStorageError, UnitOfWorkFactory};
use crate::domain::{Error, MainPhotoChange, Photo, PhotoId, PhotoRemovalError};

/// Upload an image and append it to the caller's album.
#[derive(Debug, Clone)]
pub struct AddPhoto {
    pub image: ImageUpload,
}

impl Request for AddPhoto {
    type Response = Photo;
    const NAME: &'static str = "add_photo";
}

/// Remove one of the caller's non-main photos.
#[derive(Debug, Clone)]
pub struct DeletePhoto {
    pub id: PhotoId,
}

impl Request for DeletePhoto {
    type Response = ();
    const NAME: &'static str = "delete_photo";
}

/// Promote one of the caller's photos to main.
#[derive(Debug, Clone)]
pub struct SetMainPhoto {
    pub id: PhotoId,
}

impl Request for SetMainPhoto {
    type Response = ();
    const NAME: &'static str = "set_main_photo";
}

/// Handles the caller's photo album.
pub struct PhotoService<F, S> {
    uow: Arc<F>,
    storage: Arc<S>,
}

impl<F, S> PhotoService<F, S> {
    pub fn new(uow: Arc<F>, storage: Arc<S>) -> Self {
        Self { uow, storage }
    }
}

impl<F, S> PhotoService<F, S>
where
    S: PhotoStorage,
{
    /// Remove an uploaded image whose album entry was never saved.
    async fn discard_upload(&self, id: &PhotoId) {
        match self.storage.delete(id).await {
            Ok(true) => debug!(photo_id = %id, "discarded unsaved upload"),
            Ok(false) => warn!(photo_id = %id, "unsaved upload was already gone"),
            Err(err) => {
                error!(photo_id = %id, error = %err, "failed to discard unsaved upload");
            }
        }
    }
}

fn map_storage_error(error: PhotoStorageError) -> Error {
    error!(error = %error, kind = error.kind(), "photo storage failure");
    Error::internal(error.to_string())
}

fn photo_not_found(id: &PhotoId) -> Error {
    Error::not_found(format!("photo {id} not found")).with_field("photo", "photo not found")
}

#[async_trait]
impl<F, S> RequestHandler<AddPhoto> for PhotoService<F, S>
where
    F: UnitOfWorkFactory,
    S: PhotoStorage,
{
    async fn handle(&self, context: &RequestContext, request: AddPhoto) -> Result<Photo, Error> {
        let mut uow = begin(self.uow.as_ref()).await?;
        let mut account = context.caller.account(uow.as_ref()).await?;

        let stored = self
            .storage
            .upload(request.image)
            .await
            .map_err(map_storage_error)?;
        let photo = account.add_photo(stored);
        uow.update_account(account.clone());
        if let Err(err) = commit(uow.as_mut(), "add photo").await {
            self.discard_upload(photo.id()).await;
            return Err(err);
        }
        info!(
            username = %account.username(),
            photo_id = %photo.id(),
            is_main = photo.is_main(),
            "photo added"
        );
        Ok(photo)
    }
}

#[async_trait]
impl<F, S> RequestHandler<DeletePhoto> for PhotoService<F, S>
where
    F: UnitOfWorkFactory,
    S: PhotoStorage,
{
    async fn handle(&self, context: &RequestContext, request: DeletePhoto) -> Result<(), Error> {
        let mut uow = begin(self.uow.as_ref()).await?;
        let mut account = context.caller.account(uow.as_ref()).await?;

        match account.remove_photo(&request.id) {
            Ok(_) => {}
            Err(PhotoRemovalError::NotFound) => return Err(photo_not_found(&request.id)),
            Err(PhotoRemovalError::IsMain) => {
                warn!(
                    username = %account.username(),
                    photo_id = %request.id,
                    "refused to delete main photo"
                );
                let message = "cannot delete the main photo";
                return Err(Error::conflict(message).with_field("photo", message));
            }
        }

        let deleted = self
            .storage
            .delete(&request.id)
            .await
            .map_err(map_storage_error)?;
        if !deleted {
            error!(photo_id = %request.id, "photo storage did not delete the image");
            return Err(Error::internal("problem deleting photo from storage"));
        }

        uow.update_account(account.clone());
        commit(uow.as_mut(), "delete photo").await?;
        info!(username = %account.username(), photo_id = %request.id, "photo deleted");
        Ok(())
    }
}

#[async_trait]
impl<F, S> RequestHandler<SetMainPhoto> for PhotoService<F, S>
where
    F: UnitOfWorkFactory,
    S: PhotoStorage,
{
    async fn handle(&self, context: &RequestContext, request: SetMainPhoto) -> Result<(), Error> {
        let mut uow = begin(self.uow.as_ref()).await?;
        let mut account = context.caller.account(uow.as_ref()).await?;

        match account.set_main_photo(&request.id) {
            None => Err(photo_not_found(&request.id)),
            Some(MainPhotoChange::Unchanged) => {
                debug!(photo_id = %request.id, "photo already main");
                Ok(())
            }
            Some(MainPhotoChange::Promoted) => {
                uow.update_account(account.clone());
                commit(uow.as_mut(), "set main photo").await?;
                info!(username = %account.username(), photo_id = %request.id, "main photo changed");
                Ok(())
            }
        }
    }
}
