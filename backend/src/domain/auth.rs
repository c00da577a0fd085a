//! Authentication primitives: credentials, password policy, and the session
//! descriptor handed back after login or registration.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port.

use std::fmt;

use serde::Serialize;
use zeroize::Zeroizing;

use super::{Account, Email, Error};

/// Plain-text password that has passed the configured policy.
///
/// The buffer is wiped on drop and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wrap a password without policy checks, for verifying a login.
    pub fn unchecked(raw: &str) -> Self {
        Self(Zeroizing::new(raw.to_owned()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// One rule of the password strength policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
    MinLength(usize),
    Uppercase,
    Lowercase,
    Digit,
    NonAlphanumeric,
}

impl fmt::Display for PasswordRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinLength(min) => write!(f, "password must be at least {min} characters"),
            Self::Uppercase => write!(f, "password must contain an uppercase letter"),
            Self::Lowercase => write!(f, "password must contain a lowercase letter"),
            Self::Digit => write!(f, "password must contain a number"),
            Self::NonAlphanumeric => {
                write!(f, "password must contain a non-alphanumeric character")
            }
        }
    }
}

/// Password rejected by the strength policy, with every rule it broke.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password does not meet the strength policy")]
pub struct PasswordPolicyError {
    pub violations: Vec<PasswordRule>,
}

impl From<PasswordPolicyError> for Error {
    fn from(value: PasswordPolicyError) -> Self {
        let detail = value
            .violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Error::invalid_request(value.to_string()).with_field("password", detail)
    }
}

/// Configurable password strength policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 6,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_non_alphanumeric: true,
        }
    }
}

impl PasswordPolicy {
    /// Check `raw` against every enabled rule.
    pub fn check(&self, raw: &str) -> Result<Password, PasswordPolicyError> {
        let has = |predicate: fn(char) -> bool| raw.chars().any(predicate);
        let checks = [
            (
                raw.chars().count() >= self.min_length,
                PasswordRule::MinLength(self.min_length),
            ),
            (
                !self.require_uppercase || has(char::is_uppercase),
                PasswordRule::Uppercase,
            ),
            (
                !self.require_lowercase || has(char::is_lowercase),
                PasswordRule::Lowercase,
            ),
            (
                !self.require_digit || has(|c| c.is_ascii_digit()),
                PasswordRule::Digit,
            ),
            (
                !self.require_non_alphanumeric || has(|c| !c.is_alphanumeric()),
                PasswordRule::NonAlphanumeric,
            ),
        ];
        let violations: Vec<PasswordRule> = checks
            .into_iter()
            .filter_map(|(passed, rule)| (!passed).then_some(rule))
            .collect();
        if violations.is_empty() {
            Ok(Password(Zeroizing::new(raw.to_owned())))
        } else {
            Err(PasswordPolicyError { violations })
        }
    }
}

/// Validated login credentials used by the identity collaborator.
///
/// ## Invariants
/// - `email` is a well-formed address.
/// - `password` is non-empty; caller whitespace is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Password,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, Error> {
        let email = Email::new(email).map_err(Error::from)?;
        if password.is_empty() {
            return Err(Error::invalid_request("password must not be empty")
                .with_field("password", "password must not be empty"));
        }
        Ok(Self {
            email,
            password: Password::unchecked(password),
        })
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Opaque bearer token.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Session descriptor returned after registering, logging in, or asking
/// for the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub display_name: String,
    pub username: String,
    pub token: AccessToken,
    pub image: Option<String>,
}

impl SessionUser {
    /// Describe `account` holding `token`; the image is the main photo URL.
    pub fn new(account: &Account, token: AccessToken) -> Self {
        Self {
            display_name: account.display_name().to_string(),
            username: account.username().to_string(),
            token,
            image: account.image_url().map(str::to_owned),
        }
    }
}
