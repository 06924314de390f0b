//! Authenticated identity handle supplied by the session provider.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors returned by [`Identity::try_from_strings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityValidationError {
    EmptyId,
    InvalidId,
}

impl fmt::Display for IdentityValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must not carry surrounding whitespace"),
        }
    }
}

impl std::error::Error for IdentityValidationError {}

/// Stable user identifier assigned by the session provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, IdentityValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    fn from_owned(id: String) -> Result<Self, IdentityValidationError> {
        if id.is_empty() {
            return Err(IdentityValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(IdentityValidationError::InvalidId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Authenticated user as seen by the directory feature.
///
/// ## Invariants
/// - `id` is non-empty and carries no surrounding whitespace.
/// - `display_name` may be empty; providers do not require one at sign-up.
///
/// Identities are read-only for the lifetime of a session.
///
/// # Examples
/// ```
/// use employee_directory::domain::Identity;
///
/// let identity = Identity::try_from_strings("u-1", "Ada", "ada@example.com").unwrap();
/// assert_eq!(identity.id().as_ref(), "u-1");
/// assert_eq!(identity.email(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    id: UserId,
    #[serde(default)]
    display_name: String,
    email: String,
}

impl Identity {
    /// Build an identity from a validated id.
    #[must_use]
    pub fn new(id: UserId, display_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            email: email.into(),
        }
    }

    /// Fallible constructor validating the identifier.
    pub fn try_from_strings(
        id: impl AsRef<str>,
        display_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, IdentityValidationError> {
        Ok(Self::new(UserId::new(id)?, display_name, email))
    }

    /// Provider-assigned user id.
    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name, empty when the provider has none.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// E-mail address used to sign in.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }
}
