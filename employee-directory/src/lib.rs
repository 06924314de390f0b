//! Employee directory core.
//!
//! A session gate admits a signed-in identity, a validated form collects
//! employee records, and a synchronised list mirrors what the remote store
//! holds. Adapters for Firebase live under [`outbound`]; configuration under
//! [`config`].

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
