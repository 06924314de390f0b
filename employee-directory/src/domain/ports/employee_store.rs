//! Driven port for the remote employee document store.
//!
//! Adapters are scoped to one named collection. The directory core treats
//! both operations as opaque, possibly-failing remote calls and converts their
//! errors into state at the call site.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{DocumentId, EmployeeRecord, StoredEmployee};

use super::define_port_error;

/// Collection name used when configuration does not override it.
pub const DEFAULT_EMPLOYEE_COLLECTION: &str = "employees";

define_port_error! {
    /// Errors raised by employee store adapters.
    pub enum EmployeeStoreError {
        /// Transport failure or a server-side error response.
        Unavailable { message: String } => "employee store unavailable: {message}",
        /// The store refused the caller's credentials.
        Unauthorized { message: String } => "employee store rejected credentials: {message}",
        /// The response could not be decoded into employee records.
        Decode { message: String } => "employee store returned malformed data: {message}",
    }
}

/// Port for listing and inserting employee records.
///
/// `insert` must not partially apply: either the record exists remotely with
/// the returned id afterwards, or it does not exist at all.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Fetch every record in the collection in the store's natural order.
    async fn list(&self) -> Result<Vec<StoredEmployee>, EmployeeStoreError>;

    /// Persist `record` and return the id the store assigned to it.
    async fn insert(&self, record: &EmployeeRecord) -> Result<DocumentId, EmployeeStoreError>;
}

/// In-memory store used by tests and local runs without a backend.
///
/// Ids are random UUIDs generated at insert time, standing in for the
/// store-assigned ids of a real backend.
#[derive(Debug, Default)]
pub struct FixtureEmployeeStore {
    records: Mutex<Vec<StoredEmployee>>,
}

impl FixtureEmployeeStore {
    /// Seed the store with existing records.
    #[must_use]
    pub fn with_records(records: Vec<StoredEmployee>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Copy of everything stored so far.
    #[must_use]
    pub fn stored(&self) -> Vec<StoredEmployee> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl EmployeeStore for FixtureEmployeeStore {
    async fn list(&self) -> Result<Vec<StoredEmployee>, EmployeeStoreError> {
        Ok(self.stored())
    }

    async fn insert(&self, record: &EmployeeRecord) -> Result<DocumentId, EmployeeStoreError> {
        let id = DocumentId::new(Uuid::new_v4().simple().to_string())
            .map_err(|err| EmployeeStoreError::decode(format!("invalid fixture id: {err}")))?;
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(StoredEmployee::new(id.clone(), record.clone()));
        Ok(id)
    }
}
