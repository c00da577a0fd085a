//! Bearer token issuance and verification.

use async_trait::async_trait;

use crate::domain::{AccessToken, Account, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenError {
        /// A token could not be produced.
        Signing { message: String } => "token signing failed: {message}",
        /// The presented token is malformed, tampered with, or foreign.
        Invalid { message: String } => "token rejected: {message}",
        /// The presented token is past its expiry.
        Expired => "token expired",
    }
}

/// Issues an opaque bearer token for an authenticated account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn issue(&self, account: &Account) -> Result<AccessToken, TokenError>;
}

/// Resolves a presented bearer token to the username it was issued for.
#[cfg_attr(test, mockall::automock)]
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Username, TokenError>;
}
