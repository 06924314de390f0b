//! Directory configuration loaded via OrthoConfig.
//!
//! Values layer defaults, an optional configuration file and `DIRECTORY_*`
//! environment variables. Required values are checked when read, not when
//! loaded, so commands that do not need them still start.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::SignInCredentials;
use crate::domain::ports::DEFAULT_EMPLOYEE_COLLECTION;
use crate::outbound::firebase_auth::DEFAULT_AUTH_BASE_URL;
use crate::outbound::firestore::DEFAULT_FIRESTORE_BASE_URL;

/// Errors raised when reading settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A required value was not supplied.
    #[error("missing required setting `{key}` (set DIRECTORY_{env})")]
    Missing {
        /// Setting name.
        key: &'static str,
        /// Environment variable suffix.
        env: &'static str,
    },
    /// A URL setting did not parse.
    #[error("setting `{key}` is not a valid URL: {message}")]
    InvalidUrl {
        /// Setting name.
        key: &'static str,
        /// Parser message.
        message: String,
    },
}

/// Connection and account settings for the directory.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DIRECTORY")]
pub struct DirectorySettings {
    /// Web API key of the Firebase project.
    pub firebase_api_key: Option<String>,
    /// Firebase project id owning the Firestore database.
    pub firebase_project_id: Option<String>,
    /// Collection holding employee documents.
    pub collection: Option<String>,
    /// Firestore REST root, overridable for the emulator.
    pub firestore_base_url: Option<String>,
    /// Identity Toolkit REST root, overridable for the emulator.
    pub auth_base_url: Option<String>,
    /// Account e-mail used to sign in.
    pub email: Option<String>,
    /// Account password used to sign in.
    pub password: Option<String>,
}

fn required<'a>(
    value: Option<&'a String>,
    key: &'static str,
    env: &'static str,
) -> Result<&'a str, SettingsError> {
    value
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
        .ok_or(SettingsError::Missing { key, env })
}

fn parse_url(raw: &str, key: &'static str) -> Result<Url, SettingsError> {
    Url::parse(raw).map_err(|error| SettingsError::InvalidUrl {
        key,
        message: error.to_string(),
    })
}

impl DirectorySettings {
    /// Return the Firebase API key.
    ///
    /// # Errors
    ///
    /// Fails when the key is unset or blank.
    pub fn firebase_api_key(&self) -> Result<&str, SettingsError> {
        required(
            self.firebase_api_key.as_ref(),
            "firebase_api_key",
            "FIREBASE_API_KEY",
        )
    }

    /// Return the Firebase project id.
    ///
    /// # Errors
    ///
    /// Fails when the id is unset or blank.
    pub fn firebase_project_id(&self) -> Result<&str, SettingsError> {
        required(
            self.firebase_project_id.as_ref(),
            "firebase_project_id",
            "FIREBASE_PROJECT_ID",
        )
    }

    /// Return the configured collection, falling back to the default.
    #[must_use]
    pub fn collection(&self) -> &str {
        self.collection
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(DEFAULT_EMPLOYEE_COLLECTION)
    }

    /// Return the Firestore REST root, falling back to the public endpoint.
    ///
    /// # Errors
    ///
    /// Fails when an override does not parse as a URL.
    pub fn firestore_base_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            self.firestore_base_url
                .as_deref()
                .unwrap_or(DEFAULT_FIRESTORE_BASE_URL),
            "firestore_base_url",
        )
    }

    /// Return the Identity Toolkit REST root, falling back to the public
    /// endpoint.
    ///
    /// # Errors
    ///
    /// Fails when an override does not parse as a URL.
    pub fn auth_base_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            self.auth_base_url.as_deref().unwrap_or(DEFAULT_AUTH_BASE_URL),
            "auth_base_url",
        )
    }

    /// Return the sign-in credentials.
    ///
    /// # Errors
    ///
    /// Fails when either the e-mail or the password is unset.
    pub fn credentials(&self) -> Result<SignInCredentials, SettingsError> {
        let email = required(self.email.as_ref(), "email", "EMAIL")?;
        let password = required(self.password.as_ref(), "password", "PASSWORD")?;
        Ok(SignInCredentials::new(email, password))
    }
}
