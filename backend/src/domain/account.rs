//! Account aggregate and its validated identity fields.
//!
//! An account owns its photo collection. Every mutation of that collection
//! goes through [`Account`] so the main-photo rule holds after each step:
//! an account with photos has exactly one main photo, an account without
//! photos has none.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::photo::{Photo, PhotoId, StoredPhoto};
use super::Error;

/// Minimum allowed length for a username.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 32;
/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 64;

/// Validation errors raised by the account value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    EmptyUsername,
    UsernameTooShort { min: usize },
    UsernameTooLong { max: usize },
    UsernameInvalidCharacters,
    EmptyEmail,
    InvalidEmail,
    EmptyDisplayName,
    DisplayNameTooLong { max: usize },
}

impl AccountValidationError {
    /// Request field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyUsername
            | Self::UsernameTooShort { .. }
            | Self::UsernameTooLong { .. }
            | Self::UsernameInvalidCharacters => "username",
            Self::EmptyEmail | Self::InvalidEmail => "email",
            Self::EmptyDisplayName | Self::DisplayNameTooLong { .. } => "displayName",
        }
    }
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooShort { min } => {
                write!(f, "username must be at least {min} characters")
            }
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain letters, numbers, dots, dashes, or underscores",
            ),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for AccountValidationError {}

impl From<AccountValidationError> for Error {
    fn from(value: AccountValidationError) -> Self {
        let message = value.to_string();
        Error::invalid_request(message.clone()).with_field(value.field(), message)
    }
}

/// Stable account identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generate a new random [`AccountId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        Regex::new("^[A-Za-z0-9_.-]+$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Login name, unique across accounts.
///
/// Uniqueness is case-insensitive; see [`Username::normalized`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(username: impl Into<String>) -> Result<Self, AccountValidationError> {
        let raw = username.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AccountValidationError::EmptyUsername);
        }
        let length = trimmed.chars().count();
        if length < USERNAME_MIN {
            return Err(AccountValidationError::UsernameTooShort { min: USERNAME_MIN });
        }
        if length > USERNAME_MAX {
            return Err(AccountValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if !username_regex().is_match(trimmed) {
            return Err(AccountValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Key used for uniqueness checks.
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Email address, unique across accounts. Stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`].
    pub fn new(email: impl Into<String>) -> Result<Self, AccountValidationError> {
        let raw = email.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AccountValidationError::EmptyEmail);
        }
        if !email_regex().is_match(trimmed) {
            return Err(AccountValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Human readable display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`].
    pub fn new(display_name: impl Into<String>) -> Result<Self, AccountValidationError> {
        let raw = display_name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AccountValidationError::EmptyDisplayName);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX {
            return Err(AccountValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Why a photo could not be removed from an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoRemovalError {
    /// The account owns no photo with that id.
    NotFound,
    /// The photo is the account's main photo.
    IsMain,
}

/// Outcome of promoting a photo to main.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainPhotoChange {
    /// The photo was already main; nothing changed.
    Unchanged,
    /// The photo became main and any previous main photo was demoted.
    Promoted,
}

/// Registered account.
///
/// ## Invariants
/// - At most one photo has `is_main` set.
/// - If the account has at least one photo, exactly one is main.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    username: Username,
    email: Email,
    display_name: DisplayName,
    bio: Option<String>,
    photos: Vec<Photo>,
    version: u64,
}

impl Account {
    /// Build a new account with no bio and no photos.
    pub fn new(id: AccountId, username: Username, email: Email, display_name: DisplayName) -> Self {
        Self {
            id,
            username,
            email,
            display_name,
            bio: None,
            photos: Vec::new(),
            version: 0,
        }
    }

    /// Stamp the stored revision this value was read at.
    #[must_use]
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Rehydrate the photo collection loaded from storage.
    ///
    /// When storage holds photos but none is flagged main, the first photo
    /// is promoted.
    #[must_use]
    pub fn with_photos(mut self, photos: Vec<Photo>) -> Self {
        self.photos = photos;
        if !self.photos.is_empty() && self.main_photo().is_none() {
            if let Some(first) = self.photos.first_mut() {
                first.set_main(true);
            }
        }
        self
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    /// Stored revision; writers must match it to replace the account.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The account's main photo, if it has any photo at all.
    pub fn main_photo(&self) -> Option<&Photo> {
        self.photos.iter().find(|photo| photo.is_main())
    }

    /// URL of the main photo, used as the account's display image.
    pub fn image_url(&self) -> Option<&str> {
        self.main_photo().map(Photo::url)
    }

    /// Look up one of the account's own photos.
    pub fn find_photo(&self, id: &PhotoId) -> Option<&Photo> {
        self.photos.iter().find(|photo| photo.id() == id)
    }

    /// Replace the display name.
    pub fn rename(&mut self, display_name: DisplayName) {
        self.display_name = display_name;
    }

    /// Replace the bio. An empty or blank value clears it.
    pub fn set_bio(&mut self, bio: &str) {
        let trimmed = bio.trim();
        self.bio = (!trimmed.is_empty()).then(|| trimmed.to_owned());
    }

    /// Append an uploaded photo, making it main when no main photo exists.
    pub fn add_photo(&mut self, stored: StoredPhoto) -> Photo {
        let is_main = self.main_photo().is_none();
        let photo = Photo::from_stored(stored, is_main);
        self.photos.push(photo.clone());
        photo
    }

    /// Remove a non-main photo the account owns.
    pub fn remove_photo(&mut self, id: &PhotoId) -> Result<Photo, PhotoRemovalError> {
        let index = self
            .photos
            .iter()
            .position(|photo| photo.id() == id)
            .ok_or(PhotoRemovalError::NotFound)?;
        if self.photos.get(index).is_some_and(Photo::is_main) {
            return Err(PhotoRemovalError::IsMain);
        }
        Ok(self.photos.remove(index))
    }

    /// Promote one of the account's photos to main, demoting the current one.
    ///
    /// Returns `None` when the account owns no photo with that id.
    pub fn set_main_photo(&mut self, id: &PhotoId) -> Option<MainPhotoChange> {
        let target = self.find_photo(id)?;
        if target.is_main() {
            return Some(MainPhotoChange::Unchanged);
        }
        for photo in &mut self.photos {
            let promote = photo.id() == id;
            photo.set_main(promote);
        }
        Some(MainPhotoChange::Promoted)
    }

    /// Whether the main-photo rule currently holds.
    pub fn has_consistent_main_photo(&self) -> bool {
        let mains = self.photos.iter().filter(|photo| photo.is_main()).count();
        if self.photos.is_empty() {
            mains == 0
        } else {
            mains == 1
        }
    }
}

#[cfg(test)]
mod tests;
