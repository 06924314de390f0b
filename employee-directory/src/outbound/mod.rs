//! Outbound adapters implementing domain ports against Firebase services.
//!
//! - **firestore**: Firestore REST implementation of `EmployeeStore`
//! - **firebase_auth**: Identity Toolkit implementation of the session ports
//!
//! Adapters translate between domain types and wire representations and map
//! transport failures into port errors. They contain no business logic.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use zeroize::Zeroizing;

pub mod firebase_auth;
pub mod firestore;

/// Errors raised while constructing an adapter.
#[derive(Debug, thiserror::Error)]
pub enum AdapterBuildError {
    /// The configured base URL cannot carry a path.
    #[error("base URL `{url}` cannot be used as an API root")]
    InvalidBaseUrl {
        /// Offending URL.
        url: String,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Shared slot holding the signed-in user's ID token.
///
/// The session adapter writes it on sign-in and clears it on sign-out; the
/// store adapter reads it to authorise requests.
#[derive(Clone, Default)]
pub struct IdToken {
    inner: Arc<Mutex<Option<Zeroizing<String>>>>,
}

impl IdToken {
    fn slot(&self) -> MutexGuard<'_, Option<Zeroizing<String>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the stored token.
    pub fn set(&self, token: impl Into<String>) {
        *self.slot() = Some(Zeroizing::new(token.into()));
    }

    /// Forget the stored token.
    pub fn clear(&self) {
        *self.slot() = None;
    }

    /// Copy of the stored token, if any.
    #[must_use]
    pub fn get(&self) -> Option<Zeroizing<String>> {
        self.slot().clone()
    }
}

impl fmt::Debug for IdToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.slot().is_some() { "<set>" } else { "<empty>" };
        f.debug_tuple("IdToken").field(&state).finish()
    }
}

/// Collapse whitespace and truncate a response body for error messages.
pub(crate) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let mut preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        preview.push_str("...");
    }
    preview
}

/// `status N` or `status N: <preview>` depending on the body.
pub(crate) fn status_message(status: reqwest::StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for shared adapter helpers.
    use super::*;
    use reqwest::StatusCode;
    use rstest::rstest;

    #[rstest]
    fn preview_compacts_whitespace() {
        assert_eq!(body_preview(b"  {\n  \"error\":   1 }\n"), "{ \"error\": 1 }");
    }

    #[rstest]
    fn preview_truncates_long_bodies() {
        let body = "x".repeat(200);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.len(), 163);
        assert!(preview.ends_with("..."));
    }

    #[rstest]
    #[case(b"".as_slice(), "status 502")]
    #[case(b"bad gateway".as_slice(), "status 502: bad gateway")]
    fn status_message_includes_preview_when_present(#[case] body: &[u8], #[case] expected: &str) {
        assert_eq!(status_message(StatusCode::BAD_GATEWAY, body), expected);
    }

    #[rstest]
    fn id_token_debug_is_redacted() {
        let token = IdToken::default();
        token.set("secret-token");
        assert_eq!(format!("{token:?}"), "IdToken(\"<set>\")");
        assert_eq!(token.get().as_deref().map(String::as_str), Some("secret-token"));
        token.clear();
        assert!(token.get().is_none());
    }
}
