//! Sign-in form feeding credentials to the session provider.
//!
//! The form validates e-mail shape and password length locally, then hands
//! the credentials to an [`Authenticator`]. A successful exchange emits the
//! dashboard intent; a refused one keeps the input and exposes the provider's
//! message.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{info, warn};
use zeroize::Zeroizing;

use super::form::{FormEngine, FormField, FormModel, FormSnapshot, SubmitOutcome, ValidationSchema};
use super::ports::{Authenticator, NavigationIntent, Navigator, SessionError};
use super::{Check, Error, Identity};

/// Message shown when the provider rejects sign-in without explaining why.
pub const SIGN_IN_FALLBACK_MESSAGE: &str = "Login Failed";

/// Fields of the sign-in form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SignInField {
    /// Account e-mail address.
    Email,
    /// Account password.
    Password,
}

impl FormField for SignInField {
    const ALL: &'static [Self] = &[Self::Email, Self::Password];

    fn name(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
        }
    }
}

/// Credentials collected by the sign-in form.
///
/// The password buffer is wiped on drop and never serialised.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignInCredentials {
    email: String,
    #[serde(skip_serializing)]
    password: Zeroizing<String>,
}

impl SignInCredentials {
    /// Build credentials from raw input.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// E-mail address as typed.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password as typed.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for SignInCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl FormModel for SignInCredentials {
    type Field = SignInField;

    fn value(&self, field: SignInField) -> &str {
        match field {
            SignInField::Email => self.email(),
            SignInField::Password => self.password(),
        }
    }

    fn value_mut(&mut self, field: SignInField) -> &mut String {
        match field {
            SignInField::Email => &mut self.email,
            SignInField::Password => &mut *self.password,
        }
    }

    fn schema() -> ValidationSchema<SignInField> {
        ValidationSchema::new()
            .rule(SignInField::Email, Check::Required, "Email is required")
            .rule(SignInField::Email, Check::Email, "Invalid email address")
            .rule(SignInField::Password, Check::Required, "Password is required")
            .rule(
                SignInField::Password,
                Check::MinChars(6),
                "Password must be at least 6 characters",
            )
    }
}

/// Read-only view of the sign-in screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInSnapshot {
    /// Form values (password omitted), touched set and visible errors.
    pub form: FormSnapshot<SignInCredentials>,
    /// Message from the last refused sign-in, if any.
    pub auth_error: Option<String>,
}

/// Sign-in screen state bound to an authenticator and a navigator.
pub struct SignInForm<A: ?Sized, N> {
    authenticator: Arc<A>,
    navigator: N,
    form: FormEngine<SignInCredentials>,
    auth_error: Mutex<Option<String>>,
}

impl<A: ?Sized, N> fmt::Debug for SignInForm<A, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInForm")
            .field("form", &self.form)
            .finish_non_exhaustive()
    }
}

impl<A, N> SignInForm<A, N>
where
    A: Authenticator + ?Sized,
    N: Navigator,
{
    /// Mount an empty sign-in form.
    #[must_use]
    pub fn new(authenticator: Arc<A>, navigator: N) -> Self {
        Self {
            authenticator,
            navigator,
            form: FormEngine::new(),
            auth_error: Mutex::new(None),
        }
    }

    fn auth_error_slot(&self) -> MutexGuard<'_, Option<String>> {
        self.auth_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrite a field value.
    pub fn set_field(&self, field: SignInField, raw: impl Into<String>) {
        self.form.set_field(field, raw);
    }

    /// Mark a field touched.
    pub fn blur_field(&self, field: SignInField) {
        self.form.blur_field(field);
    }

    /// Validate and exchange the credentials for an identity.
    ///
    /// On success the dashboard intent is emitted. On refusal the message is
    /// kept for [`SignInForm::auth_error`] and the typed input survives.
    pub async fn submit(&self) -> Result<SubmitOutcome<SignInField, Identity>, Error> {
        *self.auth_error_slot() = None;
        let authenticator = &self.authenticator;
        let result = self
            .form
            .submit(|credentials| async move { authenticator.sign_in(&credentials).await })
            .await;

        match result {
            Ok(SubmitOutcome::Persisted(identity)) => {
                info!(user_id = %identity.id(), "signed in");
                self.navigator.navigate(NavigationIntent::Dashboard);
                Ok(SubmitOutcome::Persisted(identity))
            }
            Ok(other) => Ok(other),
            Err(err) => {
                warn!(error = %err, "sign-in failed");
                let mapped = map_session_error(&err);
                *self.auth_error_slot() = Some(mapped.message().to_owned());
                Err(mapped)
            }
        }
    }

    /// Ask the host shell for the sign-up screen.
    pub fn go_to_sign_up(&self) {
        self.navigator.navigate(NavigationIntent::SignUp);
    }

    /// Message from the last refused sign-in.
    #[must_use]
    pub fn auth_error(&self) -> Option<String> {
        self.auth_error_slot().clone()
    }

    /// Underlying form state.
    #[must_use]
    pub fn form(&self) -> &FormEngine<SignInCredentials> {
        &self.form
    }

    /// Copy of the presentation-facing state.
    #[must_use]
    pub fn snapshot(&self) -> SignInSnapshot {
        SignInSnapshot {
            form: self.form.snapshot(),
            auth_error: self.auth_error(),
        }
    }
}

fn map_session_error(error: &SessionError) -> Error {
    let message = error.to_string();
    let message = if message.trim().is_empty() {
        SIGN_IN_FALLBACK_MESSAGE.to_owned()
    } else {
        message
    };
    match error {
        SessionError::InvalidCredentials { .. } => Error::unauthorized(message),
        SessionError::Unavailable { .. } | SessionError::Decode { .. } => {
            Error::sign_in_failed(message)
        }
    }
}
