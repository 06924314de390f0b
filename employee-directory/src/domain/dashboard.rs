//! Admitted feature tree: employee form plus record list.
//!
//! Only [`SessionGate::admit`](super::SessionGate::admit) mounts a dashboard.
//! A successful submit pairs the store-assigned id with the submitted values
//! and appends the result to the list.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{info, warn};

use super::directory_sync::{DirectorySnapshot, DirectorySync};
use super::form::{FormEngine, FormSnapshot, SubmitOutcome};
use super::ports::{EmployeeStore, EmployeeStoreError};
use super::{DomainResult, EmployeeField, EmployeeRecord, Error, Identity, StoredEmployee};

/// Read-only view of the whole dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Signed-in user.
    pub identity: Identity,
    /// Employee form state.
    pub form: FormSnapshot<EmployeeRecord>,
    /// Record list state.
    pub directory: DirectorySnapshot,
    /// Failure from the most recent submit, if it failed.
    pub submission_failure: Option<Error>,
}

/// Employee form and record list for one admitted identity.
pub struct Dashboard<S: ?Sized> {
    identity: Identity,
    store: Arc<S>,
    form: FormEngine<EmployeeRecord>,
    directory: DirectorySync<S>,
    submission_failure: Mutex<Option<Error>>,
}

impl<S: ?Sized> fmt::Debug for Dashboard<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("identity", &self.identity)
            .field("form", &self.form)
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}

impl<S> Dashboard<S>
where
    S: EmployeeStore + ?Sized,
{
    pub(crate) fn new(identity: Identity, store: Arc<S>) -> Self {
        Self {
            identity,
            directory: DirectorySync::new(Arc::clone(&store)),
            store,
            form: FormEngine::new(),
            submission_failure: Mutex::new(None),
        }
    }

    fn failure_slot(&self) -> MutexGuard<'_, Option<Error>> {
        self.submission_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Signed-in user this dashboard was mounted for.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Employee form state.
    #[must_use]
    pub fn form(&self) -> &FormEngine<EmployeeRecord> {
        &self.form
    }

    /// Record list state.
    #[must_use]
    pub fn directory(&self) -> &DirectorySync<S> {
        &self.directory
    }

    /// Overwrite an employee form field.
    pub fn set_field(&self, field: EmployeeField, raw: impl Into<String>) {
        self.form.set_field(field, raw);
    }

    /// Mark an employee form field touched.
    pub fn blur_field(&self, field: EmployeeField) {
        self.form.blur_field(field);
    }

    /// Load the record list.
    pub async fn load_all(&self) -> DomainResult<usize> {
        self.directory.load_all().await
    }

    /// Validate the form, insert the record, and list it.
    ///
    /// A failed insert leaves the typed values and the list untouched and is
    /// kept as the dashboard's submission failure until the next submit.
    pub async fn submit(&self) -> Result<SubmitOutcome<EmployeeField, StoredEmployee>, Error> {
        *self.failure_slot() = None;
        let store = &self.store;
        let result = self
            .form
            .submit(|record| async move {
                let id = store.insert(&record).await?;
                Ok::<_, EmployeeStoreError>(StoredEmployee::new(id, record))
            })
            .await;

        match result {
            Ok(SubmitOutcome::Persisted(stored)) => {
                info!(document_id = %stored.id(), "employee record persisted");
                self.directory.append(stored.clone());
                Ok(SubmitOutcome::Persisted(stored))
            }
            Ok(other) => Ok(other),
            Err(err) => {
                warn!(error = %err, "employee record submission failed");
                let error = map_store_error(&err);
                *self.failure_slot() = Some(error.clone());
                Err(error)
            }
        }
    }

    /// Failure from the most recent submit.
    #[must_use]
    pub fn submission_failure(&self) -> Option<Error> {
        self.failure_slot().clone()
    }

    /// Copy of the presentation-facing state.
    #[must_use]
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            identity: self.identity.clone(),
            form: self.form.snapshot(),
            directory: self.directory.snapshot(),
            submission_failure: self.submission_failure(),
        }
    }
}

fn map_store_error(error: &EmployeeStoreError) -> Error {
    Error::submission_failed(format!("failed to save employee record: {error}"))
}
