//! Account identity model.
//!
//! An [`Identity`] is the persisted account record owned by the credential
//! store. Its follow sets are only ever mutated through the social graph
//! service so the mirror invariant between `following` and `followers`
//! holds after every successful follow or unfollow.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Validation errors returned by the account value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Handle is blank.
    EmptyHandle,
    /// Handle exceeds `max` characters.
    HandleTooLong {
        /// Longest accepted handle.
        max: usize,
    },
    /// Handle contains characters outside the allowed set.
    HandleInvalidCharacters,
    /// Display name is blank.
    EmptyDisplayName,
    /// Display name exceeds `max` characters.
    DisplayNameTooLong {
        /// Longest accepted name.
        max: usize,
    },
    /// Email is blank.
    EmptyEmail,
    /// Email is not `local@domain`.
    InvalidEmail,
    /// Password is empty.
    EmptyPassword,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyHandle => write!(f, "handle must not be empty"),
            Self::HandleTooLong { max } => write!(f, "handle must be at most {max} characters"),
            Self::HandleInvalidCharacters => write!(
                f,
                "handle may only contain letters, numbers, dots, dashes, or underscores",
            ),
            Self::EmptyDisplayName => write!(f, "name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "name must be at most {max} characters")
            }
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Maximum allowed length for a handle.
pub const HANDLE_MAX: usize = 32;
/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 64;

static HANDLE_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn handle_regex() -> &'static Regex {
    HANDLE_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        Regex::new("^[A-Za-z0-9_.-]+$")
            .unwrap_or_else(|error| panic!("handle regex failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Unique human-readable account identifier.
///
/// # Examples
/// ```
/// use agora_backend::domain::Handle;
///
/// let handle = Handle::new("  ada_l ").expect("valid handle");
/// assert_eq!(handle.as_ref(), "ada_l");
/// assert!(Handle::new("ada lovelace").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    /// Validate and construct a [`Handle`], trimming surrounding whitespace.
    pub fn new(handle: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = handle.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyHandle);
        }
        if trimmed.chars().count() > HANDLE_MAX {
            return Err(UserValidationError::HandleTooLong { max: HANDLE_MAX });
        }
        if !handle_regex().is_match(trimmed) {
            return Err(UserValidationError::HandleInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Handle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Handle> for String {
    fn from(value: Handle) -> Self {
        value.0
    }
}

impl TryFrom<String> for Handle {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Human readable account name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`], trimming surrounding whitespace.
    pub fn new(name: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
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
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Contact address, unique across accounts.
///
/// Addresses are normalised to lowercase so uniqueness is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = email.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Opaque PHC-formatted password hash.
///
/// The hash never appears in `Debug` output or HTTP payloads.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a stored PHC string without further validation.
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// Access the PHC string for persistence or verification.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Persisted account record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Immutable account key.
    pub handle: Handle,
    /// Display name.
    pub name: DisplayName,
    /// Unique email address.
    pub email: EmailAddress,
    /// Argon2 PHC string.
    pub password_hash: PasswordHash,
    /// Handles following this account.
    pub followers: BTreeSet<Handle>,
    /// Handles this account follows.
    pub following: BTreeSet<Handle>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Last profile or password change.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an account record.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    /// Requested handle.
    pub handle: Handle,
    /// Display name.
    pub name: DisplayName,
    /// Email address.
    pub email: EmailAddress,
    /// Hash of the registration password.
    pub password_hash: PasswordHash,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl NewIdentity {
    /// Materialise the record with empty follow sets.
    pub fn into_identity(self) -> Identity {
        Identity {
            handle: self.handle,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            followers: BTreeSet::new(),
            following: BTreeSet::new(),
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Mutable profile fields. The handle is immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// Replacement display name.
    pub name: DisplayName,
    /// Replacement email address.
    pub email: EmailAddress,
    /// Time of the change.
    pub updated_at: DateTime<Utc>,
}
