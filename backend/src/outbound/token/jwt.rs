//! HS256 bearer tokens signed with a shared secret.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::{TokenError, TokenIssuer, TokenVerifier};
use crate::domain::{AccessToken, Account, Username};

const MAX_LIFETIME_DAYS: i64 = 366;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iss: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies bearer tokens naming the account's username.
///
/// Expiry is checked against the injected [`Clock`] rather than the system
/// time so tests can move the clock.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    pub fn new(
        secret: &[u8],
        issuer: impl Into<String>,
        lifetime: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::signing("token secret must not be empty"));
        }
        if lifetime <= Duration::zero() {
            return Err(TokenError::signing("token lifetime must be positive"));
        }
        if lifetime > Duration::days(MAX_LIFETIME_DAYS) {
            return Err(TokenError::signing(format!(
                "token lifetime must not exceed {MAX_LIFETIME_DAYS} days"
            )));
        }
        let issuer = issuer.into();
        if issuer.trim().is_empty() {
            return Err(TokenError::signing("token issuer must not be empty"));
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer,
            lifetime,
            clock,
        })
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.set_issuer(&[&self.issuer]);
        validation
    }
}

#[async_trait]
impl TokenIssuer for JwtTokenService {
    async fn issue(&self, account: &Account) -> Result<AccessToken, TokenError> {
        let now = self.clock.utc();
        let expires_at = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| TokenError::signing("token expiry is out of range"))?;
        let claims = Claims {
            sub: account.username().to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| TokenError::signing(err.to_string()))?;
        debug!(username = %account.username(), "bearer token issued");
        Ok(AccessToken::new(token))
    }
}

impl TokenVerifier for JwtTokenService {
    fn verify(&self, token: &str) -> Result<Username, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation()).map_err(
            |err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::expired(),
                _ => TokenError::invalid(err.to_string()),
            },
        )?;
        if data.claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenError::expired());
        }
        Username::new(data.claims.sub).map_err(|err| TokenError::invalid(err.to_string()))
    }
}
