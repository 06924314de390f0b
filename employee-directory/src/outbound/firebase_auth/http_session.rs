//! Reqwest-backed Firebase Authentication session.
//!
//! No session is persisted between runs, so the provider starts resolved with
//! nobody signed in. A successful sign-in stores the ID token for the store
//! adapter and publishes the identity to subscribers.

use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tokio::sync::watch;

use super::dto::{ErrorEnvelopeDto, SignInRequestDto, SignInResponseDto};
use crate::domain::ports::{Authenticator, SessionError, SessionProvider, SessionSnapshot};
use crate::domain::{Identity, SignInCredentials};
use crate::outbound::{AdapterBuildError, IdToken, status_message};

/// Public Identity Toolkit endpoint.
pub const DEFAULT_AUTH_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

const SIGN_IN_PATH: [&str; 2] = ["v1", "accounts:signInWithPassword"];

/// Session provider backed by Firebase e-mail/password authentication.
pub struct FirebaseAuthSession {
    client: Client,
    sign_in_url: Url,
    sender: watch::Sender<SessionSnapshot>,
    id_token: IdToken,
}

impl fmt::Debug for FirebaseAuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseAuthSession")
            .field("host", &self.sign_in_url.host_str())
            .field("id_token", &self.id_token)
            .finish_non_exhaustive()
    }
}

impl FirebaseAuthSession {
    /// Build a session adapter for the project owning `api_key`.
    ///
    /// # Errors
    ///
    /// Returns an error when `base_url` cannot carry a path or the reqwest
    /// client cannot be constructed.
    pub fn new(base_url: &Url, api_key: &str) -> Result<Self, AdapterBuildError> {
        let sign_in_url = sign_in_url(base_url, api_key)?;
        let client = Client::builder().build()?;
        let (sender, _receiver) = watch::channel(SessionSnapshot::signed_out());
        Ok(Self {
            client,
            sign_in_url,
            sender,
            id_token: IdToken::default(),
        })
    }

    /// Handle to the ID token slot, for authorising store requests.
    #[must_use]
    pub fn id_token(&self) -> IdToken {
        self.id_token.clone()
    }

    async fn exchange(
        &self,
        credentials: &SignInCredentials,
    ) -> Result<SignInResponseDto, SessionError> {
        let payload = SignInRequestDto {
            email: credentials.email(),
            password: credentials.password(),
            return_secure_token: true,
        };
        let response = self
            .client
            .post(self.sign_in_url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        serde_json::from_slice(body.as_ref()).map_err(|error| {
            SessionError::decode(format!("invalid sign-in response payload: {error}"))
        })
    }
}

#[async_trait]
impl SessionProvider for FirebaseAuthSession {
    fn current(&self) -> SessionSnapshot {
        self.sender.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.sender.subscribe()
    }

    async fn end_session(&self) {
        self.id_token.clear();
        self.sender.send_replace(SessionSnapshot::signed_out());
    }
}

#[async_trait]
impl Authenticator for FirebaseAuthSession {
    async fn sign_in(&self, credentials: &SignInCredentials) -> Result<Identity, SessionError> {
        let response = self.exchange(credentials).await?;
        let identity = response
            .identity()
            .map_err(|error| SessionError::decode(format!("invalid user id: {error}")))?;
        self.id_token.set(response.id_token);
        self.sender
            .send_replace(SessionSnapshot::signed_in(identity.clone()));
        Ok(identity)
    }
}

fn sign_in_url(base_url: &Url, api_key: &str) -> Result<Url, AdapterBuildError> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|()| AdapterBuildError::InvalidBaseUrl {
            url: base_url.to_string(),
        })?
        .pop_if_empty()
        .extend(SIGN_IN_PATH);
    url.query_pairs_mut().clear().append_pair("key", api_key);
    Ok(url)
}

fn map_transport_error(error: reqwest::Error) -> SessionError {
    SessionError::unavailable(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> SessionError {
    let code = serde_json::from_slice::<ErrorEnvelopeDto>(body)
        .map(|envelope| envelope.error.code().to_owned())
        .unwrap_or_default();
    match credential_error_code(&code) {
        Some(auth_code) => {
            SessionError::invalid_credentials(format!("Firebase: Error (auth/{auth_code})."))
        }
        None => SessionError::unavailable(status_message(status, body)),
    }
}

fn credential_error_code(provider_code: &str) -> Option<&'static str> {
    match provider_code {
        "INVALID_PASSWORD" => Some("wrong-password"),
        "EMAIL_NOT_FOUND" => Some("user-not-found"),
        "INVALID_LOGIN_CREDENTIALS" => Some("invalid-credential"),
        "USER_DISABLED" => Some("user-disabled"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network sign-in mapping helpers.

    use super::*;
    use rstest::rstest;

    fn error_body(message: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "error": { "code": 400, "message": message, "errors": [] }
        }))
        .expect("encode error body")
    }

    #[rstest]
    fn sign_in_url_carries_the_api_key() {
        let base = Url::parse(DEFAULT_AUTH_BASE_URL).expect("valid base URL");
        let url = sign_in_url(&base, "demo-key").expect("url builds");
        assert_eq!(
            url.as_str(),
            "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword?key=demo-key"
        );
    }

    #[rstest]
    #[case("INVALID_PASSWORD", "Firebase: Error (auth/wrong-password).")]
    #[case("EMAIL_NOT_FOUND", "Firebase: Error (auth/user-not-found).")]
    #[case("INVALID_LOGIN_CREDENTIALS", "Firebase: Error (auth/invalid-credential).")]
    #[case("USER_DISABLED : The user account has been disabled.", "Firebase: Error (auth/user-disabled).")]
    fn refused_credentials_map_to_invalid_credentials(
        #[case] provider_message: &str,
        #[case] expected: &str,
    ) {
        let error = map_status_error(StatusCode::BAD_REQUEST, &error_body(provider_message));
        assert_eq!(error, SessionError::invalid_credentials(expected));
    }

    #[rstest]
    #[case(StatusCode::BAD_REQUEST, error_body("TOO_MANY_ATTEMPTS_TRY_LATER"))]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, b"upstream exploded".to_vec())]
    fn other_failures_map_to_unavailable(#[case] status: StatusCode, #[case] body: Vec<u8>) {
        let error = map_status_error(status, &body);
        assert!(matches!(error, SessionError::Unavailable { .. }));
        assert!(error.to_string().contains(&status.as_u16().to_string()));
    }

    #[rstest]
    fn response_decodes_into_identity() {
        let body = r#"{
            "kind": "identitytoolkit#VerifyPasswordResponse",
            "localId": "uid-123",
            "email": "admin@example.com",
            "displayName": "",
            "idToken": "header.payload.signature",
            "registered": true,
            "refreshToken": "refresh",
            "expiresIn": "3600"
        }"#;
        let response: SignInResponseDto = serde_json::from_str(body).expect("decodes");
        let identity = response.identity().expect("valid identity");
        assert_eq!(identity.id().as_ref(), "uid-123");
        assert_eq!(identity.email(), "admin@example.com");
        assert_eq!(response.id_token, "header.payload.signature");
    }

    #[rstest]
    #[tokio::test]
    async fn starts_signed_out_and_ends_sessions() {
        let base = Url::parse(DEFAULT_AUTH_BASE_URL).expect("valid base URL");
        let session = FirebaseAuthSession::new(&base, "demo-key").expect("adapter builds");
        assert_eq!(session.current(), SessionSnapshot::signed_out());

        session.id_token().set("token");
        session.end_session().await;

        assert!(session.id_token().get().is_none());
        assert!(!format!("{session:?}").contains("demo-key"));
    }
}
