//! Authentication primitives such as login and registration inputs.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a service.

use zeroize::Zeroizing;

use super::{DisplayName, EmailAddress, Handle, UserValidationError};

/// Validated login credentials used by the account service.
///
/// ## Invariants
/// - `email` is a syntactically valid, lowercased address.
/// - `password` must be non-empty but retains caller-provided whitespace to
///   avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use agora_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("ada@example.com", "pw").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// assert_eq!(creds.password(), "pw");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, UserValidationError> {
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }

        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Address used for the account lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    name: DisplayName,
    handle: Handle,
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate every field of a sign-up request.
    pub fn try_from_parts(
        name: &str,
        handle: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, UserValidationError> {
        let name = DisplayName::new(name)?;
        let handle = Handle::new(handle)?;
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        Ok(Self {
            name,
            handle,
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Validated display name.
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Validated handle.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Validated email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Plaintext password, zeroized on drop.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
