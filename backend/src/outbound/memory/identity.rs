//! In-memory [`IdentityProvider`] storing salted SHA-256 password digests.

use async_trait::async_trait;
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::ports::{IdentityError, IdentityProvider, NewAccount, UniqueConstraint};
use crate::domain::{Account, AccountId, LoginCredentials, Password};

use super::store::{Credential, InMemoryStore};

const SALT_LEN: usize = 16;

fn digest(salt: &str, password: &Password) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.expose().as_bytes());
    hex::encode(hasher.finalize())
}

fn new_salt() -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill(&mut salt);
    hex::encode(salt)
}

/// Identity adapter that shares its account table with the
/// [`InMemoryStore`] unit of work.
#[derive(Debug, Clone)]
pub struct InMemoryIdentityProvider {
    store: InMemoryStore,
}

impl InMemoryIdentityProvider {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn create_account(
        &self,
        account: NewAccount,
        password: &Password,
    ) -> Result<Account, IdentityError> {
        let mut state = self
            .store
            .lock()
            .map_err(|err| IdentityError::unavailable(err.to_string()))?;
        if state.account_by_email(&account.email).is_some() {
            return Err(IdentityError::duplicate(UniqueConstraint::AccountEmail));
        }
        if state.account_by_username(&account.username).is_some() {
            return Err(IdentityError::duplicate(UniqueConstraint::AccountUsername));
        }

        let NewAccount {
            username,
            email,
            display_name,
        } = account;
        let created = Account::new(AccountId::random(), username, email, display_name);
        let salt = new_salt();
        let credential = Credential {
            digest: digest(&salt, password),
            salt,
        };
        state.credentials.insert(created.id(), credential);
        state.accounts.insert(created.id(), created.clone());
        debug!(username = %created.username(), "in-memory account created");
        Ok(created)
    }

    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Option<Account>, IdentityError> {
        let state = self
            .store
            .lock()
            .map_err(|err| IdentityError::unavailable(err.to_string()))?;
        let Some(account) = state.account_by_email(credentials.email()) else {
            return Ok(None);
        };
        let matches = state
            .credentials
            .get(&account.id())
            .is_some_and(|stored| digest(&stored.salt, credentials.password()) == stored.digest);
        Ok(matches.then(|| account.clone()))
    }
}
