//! Test utilities for the directory crate.
//!
//! Shared between unit tests in `src/` and behaviour tests in `tests/`. Only
//! compiled for tests or with the `test-support` feature.

pub mod records {
    //! Employee record builders.

    use crate::domain::{DocumentId, EmployeeRecord, StoredEmployee};

    /// Complete record whose fields are derived from `name`.
    pub fn complete_record(name: &str) -> EmployeeRecord {
        EmployeeRecord {
            name: name.to_owned(),
            department: "Engineering".to_owned(),
            position: "Developer".to_owned(),
            employee_id: format!("E-{name}"),
            phone: "5551234".to_owned(),
        }
    }

    /// Persisted record with document id `id`.
    ///
    /// # Panics
    ///
    /// Panics when `id` is blank.
    pub fn stored(id: &str, name: &str) -> StoredEmployee {
        let id = match DocumentId::new(id) {
            Ok(id) => id,
            Err(error) => panic!("test document id must be valid: {error}"),
        };
        StoredEmployee::new(id, complete_record(name))
    }
}

pub mod store {
    //! Scripted employee store double.
    //!
    //! Responses are queued per operation and served in order. Either
    //! operation can be held open until the test releases it, which is how
    //! tests interleave a slow load with a submit.

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use crate::domain::ports::{EmployeeStore, EmployeeStoreError};
    use crate::domain::{DocumentId, EmployeeRecord, StoredEmployee};

    type ListResponse = Result<Vec<StoredEmployee>, EmployeeStoreError>;
    type InsertResponse = Result<DocumentId, EmployeeStoreError>;

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Employee store serving queued responses.
    ///
    /// An empty list queue answers with no records; an empty insert queue
    /// answers with `doc-<n>` where `n` counts inserts from one.
    #[derive(Debug, Default)]
    pub struct ScriptedEmployeeStore {
        list_responses: Mutex<VecDeque<ListResponse>>,
        insert_responses: Mutex<VecDeque<InsertResponse>>,
        inserted: Mutex<Vec<EmployeeRecord>>,
        list_calls: AtomicUsize,
        list_gate: Mutex<Option<Arc<Notify>>>,
        insert_gate: Mutex<Option<Arc<Notify>>>,
    }

    impl ScriptedEmployeeStore {
        /// Queue the next `list` response.
        pub fn push_list(&self, response: ListResponse) {
            lock(&self.list_responses).push_back(response);
        }

        /// Queue the next `insert` response.
        pub fn push_insert(&self, response: InsertResponse) {
            lock(&self.insert_responses).push_back(response);
        }

        /// Make every later `list` call wait for the returned handle.
        ///
        /// Call `notify_one` once per held call to let it answer.
        pub fn hold_list(&self) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            *lock(&self.list_gate) = Some(Arc::clone(&gate));
            gate
        }

        /// Make every later `insert` call wait for the returned handle.
        pub fn hold_insert(&self) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            *lock(&self.insert_gate) = Some(Arc::clone(&gate));
            gate
        }

        /// Records passed to `insert`, oldest first.
        pub fn inserted(&self) -> Vec<EmployeeRecord> {
            lock(&self.inserted).clone()
        }

        /// Number of `list` calls so far.
        pub fn list_calls(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EmployeeStore for ScriptedEmployeeStore {
        async fn list(&self) -> Result<Vec<StoredEmployee>, EmployeeStoreError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            let gate = lock(&self.list_gate).clone();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            lock(&self.list_responses)
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn insert(&self, record: &EmployeeRecord) -> Result<DocumentId, EmployeeStoreError> {
            let count = {
                let mut inserted = lock(&self.inserted);
                inserted.push(record.clone());
                inserted.len()
            };
            let gate = lock(&self.insert_gate).clone();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            let scripted = lock(&self.insert_responses).pop_front();
            match scripted {
                Some(response) => response,
                None => DocumentId::new(format!("doc-{count}"))
                    .map_err(|error| EmployeeStoreError::decode(error.to_string())),
            }
        }
    }
}
