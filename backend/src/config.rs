//! Identity configuration loaded via OrthoConfig.
//!
//! Token signing and password strength are read from `IDENTITY_*`
//! environment variables, config files, or the command line.

use std::sync::Arc;

use chrono::Duration;
use mockable::Clock;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::PasswordPolicy;
use crate::domain::ports::TokenError;
use crate::outbound::token::JwtTokenService;

const DEFAULT_ISSUER: &str = "activity-hub";
const DEFAULT_TOKEN_LIFETIME_MINUTES: i64 = 7 * 24 * 60;

/// Errors raised while turning settings into collaborators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("IDENTITY_TOKEN_SECRET must be set")]
    MissingSecret,
    #[error("IDENTITY_TOKEN_LIFETIME_MINUTES is out of range: {0}")]
    LifetimeOutOfRange(i64),
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Token and password policy settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "IDENTITY")]
pub struct IdentitySettings {
    /// Shared secret used to sign bearer tokens.
    pub token_secret: Option<String>,
    /// Value of the `iss` claim.
    pub token_issuer: Option<String>,
    /// Token lifetime in minutes.
    pub token_lifetime_minutes: Option<i64>,
    /// Minimum password length.
    pub password_min_length: Option<usize>,
    pub password_require_uppercase: Option<bool>,
    pub password_require_lowercase: Option<bool>,
    pub password_require_digit: Option<bool>,
    pub password_require_non_alphanumeric: Option<bool>,
}

impl IdentitySettings {
    /// Configured issuer, falling back to the default.
    pub fn token_issuer(&self) -> &str {
        self.token_issuer.as_deref().unwrap_or(DEFAULT_ISSUER)
    }

    /// Configured token lifetime, falling back to seven days.
    pub fn token_lifetime(&self) -> Result<Duration, SettingsError> {
        let minutes = self
            .token_lifetime_minutes
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_MINUTES);
        Duration::try_minutes(minutes).ok_or(SettingsError::LifetimeOutOfRange(minutes))
    }

    /// Password policy with every unset rule at its default.
    pub fn password_policy(&self) -> PasswordPolicy {
        let defaults = PasswordPolicy::default();
        PasswordPolicy {
            min_length: self.password_min_length.unwrap_or(defaults.min_length),
            require_uppercase: self
                .password_require_uppercase
                .unwrap_or(defaults.require_uppercase),
            require_lowercase: self
                .password_require_lowercase
                .unwrap_or(defaults.require_lowercase),
            require_digit: self.password_require_digit.unwrap_or(defaults.require_digit),
            require_non_alphanumeric: self
                .password_require_non_alphanumeric
                .unwrap_or(defaults.require_non_alphanumeric),
        }
    }

    /// Build the token service from these settings.
    pub fn token_service(&self, clock: Arc<dyn Clock>) -> Result<JwtTokenService, SettingsError> {
        let secret = self
            .token_secret
            .as_deref()
            .filter(|secret| !secret.trim().is_empty())
            .ok_or(SettingsError::MissingSecret)?;
        Ok(JwtTokenService::new(
            secret.as_bytes(),
            self.token_issuer(),
            self.token_lifetime()?,
            clock,
        )?)
    }
}
