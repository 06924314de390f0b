//! Canonical in-memory list of persisted employee records.
//!
//! [`DirectorySync`] performs the initial load from the store and appends
//! records after each successful submit. Loads and appends may interleave;
//! records are merged by document id so that a slow load never drops a
//! record appended while it was in flight, and an append never duplicates a
//! record the load already returned.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{info, warn};

use super::ports::{EmployeeStore, EmployeeStoreError};
use super::{DocumentId, DomainResult, Error, StoredEmployee};

/// Progress of the record list load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum LoadStatus {
    /// No load has been requested yet.
    NotStarted,
    /// A load is in flight.
    Loading,
    /// The most recent load succeeded.
    Loaded,
    /// The most recent load failed; the list kept its previous contents.
    Failed(Error),
}

/// Read-only view of the record list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorySnapshot {
    /// Persisted records in display order.
    pub records: Vec<StoredEmployee>,
    /// Load progress.
    pub load: LoadStatus,
}

#[derive(Debug)]
struct DirectoryState {
    records: Vec<StoredEmployee>,
    load: LoadStatus,
    // Number of the most recently started load.
    started: u64,
    // Number of the load whose result `records` currently reflects.
    applied: u64,
    loads_in_flight: usize,
    // Records appended while any load was in flight, tagged with `started`
    // at append time. Loads numbered at or below the tag may have missed them.
    pending_appends: Vec<(u64, StoredEmployee)>,
}

impl DirectoryState {
    fn contains(&self, id: &DocumentId) -> bool {
        self.records.iter().any(|record| record.id() == id)
    }

    fn begin_load(&mut self) -> u64 {
        self.started += 1;
        self.loads_in_flight += 1;
        self.load = LoadStatus::Loading;
        self.started
    }

    fn finish_load(&mut self, outcome: LoadStatus) {
        self.loads_in_flight = self.loads_in_flight.saturating_sub(1);
        if self.loads_in_flight == 0 {
            self.pending_appends.clear();
            self.load = outcome;
        }
    }

    fn apply(&mut self, generation: u64, fetched: Vec<StoredEmployee>) {
        if generation < self.applied {
            return;
        }
        let returned: HashSet<DocumentId> =
            fetched.iter().map(|record| record.id().clone()).collect();
        self.pending_appends
            .retain(|(tag, record)| *tag >= generation && !returned.contains(record.id()));
        self.records = fetched;
        self.records.extend(
            self.pending_appends
                .iter()
                .map(|(_, record)| record.clone()),
        );
        self.applied = generation;
    }
}

/// Record list synchronised with an [`EmployeeStore`].
pub struct DirectorySync<S: ?Sized> {
    store: Arc<S>,
    state: Mutex<DirectoryState>,
}

impl<S: ?Sized> fmt::Debug for DirectorySync<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("DirectorySync")
            .field("records", &state.records.len())
            .field("load", &state.load)
            .finish_non_exhaustive()
    }
}

impl<S: ?Sized> DirectorySync<S> {
    fn state(&self) -> MutexGuard<'_, DirectoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a persisted record to the end of the list.
    ///
    /// A record whose id is already listed is ignored. Never contacts the
    /// store.
    pub fn append(&self, record: StoredEmployee) {
        let mut state = self.state();
        if state.contains(record.id()) {
            return;
        }
        if state.loads_in_flight > 0 {
            let tag = state.started;
            state.pending_appends.push((tag, record.clone()));
        }
        state.records.push(record);
    }

    /// Copy of the current records.
    #[must_use]
    pub fn records(&self) -> Vec<StoredEmployee> {
        self.state().records.clone()
    }

    /// Current load progress.
    #[must_use]
    pub fn load_status(&self) -> LoadStatus {
        self.state().load.clone()
    }

    /// Copy of the presentation-facing state.
    #[must_use]
    pub fn snapshot(&self) -> DirectorySnapshot {
        let state = self.state();
        DirectorySnapshot {
            records: state.records.clone(),
            load: state.load.clone(),
        }
    }
}

impl<S> DirectorySync<S>
where
    S: EmployeeStore + ?Sized,
{
    /// Mount an empty list backed by `store`.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            state: Mutex::new(DirectoryState {
                records: Vec::new(),
                load: LoadStatus::NotStarted,
                started: 0,
                applied: 0,
                loads_in_flight: 0,
                pending_appends: Vec::new(),
            }),
        }
    }

    /// Fetch every record and replace the list with the store's order.
    ///
    /// Records appended while any load was in flight and missing from the
    /// result are kept at the end. When loads overlap, a result from a load
    /// started before the one already applied is discarded. On failure the
    /// list is untouched and the error is both stored in
    /// [`LoadStatus::Failed`] and returned. Returns the number of listed
    /// records on success.
    pub async fn load_all(&self) -> DomainResult<usize> {
        let generation = self.state().begin_load();

        match self.store.list().await {
            Ok(fetched) => {
                let mut state = self.state();
                state.apply(generation, fetched);
                state.finish_load(LoadStatus::Loaded);
                let count = state.records.len();
                drop(state);
                info!(count, "employee records loaded");
                Ok(count)
            }
            Err(err) => {
                warn!(error = %err, "employee record load failed");
                let error = map_store_error(&err);
                self.state()
                    .finish_load(LoadStatus::Failed(error.clone()));
                Err(error)
            }
        }
    }
}

fn map_store_error(error: &EmployeeStoreError) -> Error {
    Error::load_failed(format!("failed to load employee records: {error}"))
}
