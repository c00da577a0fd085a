//! Driven ports: the collaborators the handlers depend on.

mod macros;
pub(crate) use macros::define_port_error;

mod identity;
mod photo_storage;
mod token;
mod unit_of_work;

#[cfg(test)]
pub use identity::MockIdentityProvider;
pub use identity::{IdentityError, IdentityProvider, NewAccount};
#[cfg(test)]
pub use photo_storage::MockPhotoStorage;
pub use photo_storage::{ImageUpload, PhotoStorage, PhotoStorageError};
#[cfg(test)]
pub use token::{MockTokenIssuer, MockTokenVerifier};
pub use token::{TokenError, TokenIssuer, TokenVerifier};
#[cfg(test)]
pub use unit_of_work::{MockUnitOfWork, MockUnitOfWorkFactory};
pub use unit_of_work::{PersistenceError, UniqueConstraint, UnitOfWork, UnitOfWorkFactory};
