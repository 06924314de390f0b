//! Ports for the external session provider.
//!
//! The provider owns credentials and identity resolution. The core reads its
//! reactive session snapshot through [`SessionProvider`] and hands validated
//! sign-in credentials to [`Authenticator`]; it never stores either itself.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::{Identity, SignInCredentials};

use super::define_port_error;

/// Fixture account accepted by [`FixtureSessionProvider`].
pub const FIXTURE_EMAIL: &str = "admin@example.com";
/// Password for [`FIXTURE_EMAIL`].
pub const FIXTURE_PASSWORD: &str = "password";

define_port_error! {
    /// Errors raised by session provider adapters.
    pub enum SessionError {
        /// The provider rejected the e-mail/password pair.
        InvalidCredentials { message: String } => "{message}",
        /// Transport failure or unexpected provider response.
        Unavailable { message: String } => "session provider unavailable: {message}",
        /// The provider answered with a payload the adapter could not read.
        Decode { message: String } => "session provider returned malformed data: {message}",
    }
}

/// Session state published by the provider.
///
/// `loading` is true while the provider is still resolving whether a user is
/// signed in; `identity` is meaningless until it clears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Authenticated user, if any.
    pub identity: Option<Identity>,
    /// Whether resolution is still in progress.
    pub loading: bool,
}

impl SessionSnapshot {
    /// Snapshot published before the provider has resolved anything.
    #[must_use]
    pub fn loading() -> Self {
        Self {
            identity: None,
            loading: true,
        }
    }

    /// Resolved snapshot with nobody signed in.
    #[must_use]
    pub fn signed_out() -> Self {
        Self {
            identity: None,
            loading: false,
        }
    }

    /// Resolved snapshot carrying `identity`.
    #[must_use]
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            loading: false,
        }
    }
}

/// Read side of the session provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Current session snapshot.
    fn current(&self) -> SessionSnapshot;

    /// Receiver notified whenever the snapshot changes.
    fn subscribe(&self) -> watch::Receiver<SessionSnapshot>;

    /// Clear the identity. Fire-and-forget: failures are the provider's
    /// concern and the session is assumed to end eventually.
    async fn end_session(&self);
}

/// Credential exchange offered by the session provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Exchange credentials for an identity and publish it as the current
    /// session.
    async fn sign_in(&self, credentials: &SignInCredentials) -> Result<Identity, SessionError>;
}

/// Watch-channel backed provider used by tests and local runs.
///
/// Starts in whichever state the constructor names; tests drive transitions
/// through [`FixtureSessionProvider::resolve`].
#[derive(Debug)]
pub struct FixtureSessionProvider {
    sender: watch::Sender<SessionSnapshot>,
}

impl FixtureSessionProvider {
    /// Provider whose session is still resolving.
    #[must_use]
    pub fn loading() -> Self {
        Self::with_snapshot(SessionSnapshot::loading())
    }

    /// Provider resolved with nobody signed in.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::with_snapshot(SessionSnapshot::signed_out())
    }

    /// Provider resolved with `identity` signed in.
    #[must_use]
    pub fn signed_in(identity: Identity) -> Self {
        Self::with_snapshot(SessionSnapshot::signed_in(identity))
    }

    fn with_snapshot(snapshot: SessionSnapshot) -> Self {
        let (sender, _receiver) = watch::channel(snapshot);
        Self { sender }
    }

    /// Finish resolution with `identity` (or nobody).
    pub fn resolve(&self, identity: Option<Identity>) {
        self.sender.send_replace(SessionSnapshot {
            identity,
            loading: false,
        });
    }

    /// Identity handed out for the fixture account.
    ///
    /// # Panics
    ///
    /// Never in practice: the fixture id is a non-empty constant.
    #[must_use]
    pub fn fixture_identity() -> Identity {
        match Identity::try_from_strings("fixture-admin", "Admin", FIXTURE_EMAIL) {
            Ok(identity) => identity,
            Err(err) => panic!("fixture identity must satisfy validation: {err}"),
        }
    }
}

#[async_trait]
impl SessionProvider for FixtureSessionProvider {
    fn current(&self) -> SessionSnapshot {
        self.sender.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.sender.subscribe()
    }

    async fn end_session(&self) {
        self.sender.send_replace(SessionSnapshot::signed_out());
    }
}

#[async_trait]
impl Authenticator for FixtureSessionProvider {
    async fn sign_in(&self, credentials: &SignInCredentials) -> Result<Identity, SessionError> {
        if credentials.email() == FIXTURE_EMAIL && credentials.password() == FIXTURE_PASSWORD {
            let identity = Self::fixture_identity();
            self.sender
                .send_replace(SessionSnapshot::signed_in(identity.clone()));
            Ok(identity)
        } else {
            Err(SessionError::invalid_credentials(
                "Firebase: Error (auth/invalid-credential).",
            ))
        }
    }
}
