//! Process-local adapters for the persistence, identity, and photo ports.
//!
//! All three share one [`InMemoryStore`], so accounts created through the
//! identity adapter are visible to the unit of work immediately.

mod identity;
mod photo_storage;
mod store;
mod unit_of_work;

pub use identity::InMemoryIdentityProvider;
pub use photo_storage::InMemoryPhotoStorage;
pub use store::InMemoryStore;
pub use unit_of_work::InMemoryUnitOfWork;
