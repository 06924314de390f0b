//! Firestore outbound adapter.
//!
//! Thin REST implementation of the `EmployeeStore` port against one
//! Firestore collection.

mod dto;
mod http_store;

pub use http_store::{DEFAULT_FIRESTORE_BASE_URL, FirestoreEmployeeStore};
