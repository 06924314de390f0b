//! Firebase Authentication outbound adapter.
//!
//! Exchanges e-mail/password credentials through the Identity Toolkit REST
//! API and republishes the result as the session provider's reactive
//! snapshot.

mod dto;
mod http_session;

pub use http_session::{DEFAULT_AUTH_BASE_URL, FirebaseAuthSession};
