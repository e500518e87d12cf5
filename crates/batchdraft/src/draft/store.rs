//! Ordered draft row storage.
//!
//! `RowStore` owns the rows and only exposes commands; nothing outside this
//! module can reach a record mutably. `SharedRowStore` is the cloneable handle
//! used by both the grid and the upload orchestrator. Every command takes the
//! lock exactly once, so an edit and a status write never interleave inside a
//! single record.

use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use crate::draft::record::{new_row_id, DraftField, DraftRecord, RowStatus};
use crate::error::ValidationError;
use crate::validation::{is_candidate, validate};

/// Number of empty rows a fresh grid starts with.
pub const DEFAULT_ROW_COUNT: usize = 5;

/// Result of a field edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditOutcome {
    Applied,
    /// No row with that id; nothing changed.
    NotFound,
    /// The row is being dispatched right now; edits wait until it settles.
    Locked,
}

/// Read-only view of a row selected for the current run.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Position within the candidate list (not within the store).
    pub index: usize,
    pub record: DraftRecord,
}

#[derive(Debug, Clone, Default)]
pub struct RowStore {
    rows: Vec<DraftRecord>,
}

impl RowStore {
    /// Creates a store holding `count` empty pending rows.
    pub fn new(count: usize) -> Self {
        let mut store = Self { rows: Vec::new() };
        store.add_empty_rows(count);
        store
    }

    pub fn rows(&self) -> &[DraftRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&DraftRecord> {
        self.rows.iter().find(|r| r.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    /// Returns a record with an id that is not already in use.
    fn with_unique_id(&self, mut record: DraftRecord) -> DraftRecord {
        while self.get(&record.id).is_some() {
            record.id = new_row_id();
        }
        record
    }

    /// Appends `count` empty pending rows and returns their ids.
    pub fn add_empty_rows(&mut self, count: usize) -> Vec<String> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let record = self.with_unique_id(DraftRecord::empty());
            ids.push(record.id.clone());
            self.rows.push(record);
        }
        ids
    }

    /// Replaces one field on the row with `id`.
    pub fn update_field(&mut self, id: &str, field: DraftField) -> EditOutcome {
        match self.rows.iter_mut().find(|r| r.id == id) {
            None => EditOutcome::NotFound,
            Some(record) if record.status == RowStatus::Uploading => EditOutcome::Locked,
            Some(record) => {
                record.apply(field);
                EditOutcome::Applied
            }
        }
    }

    /// Removes the row, keeping the order of the rest. Returns whether a row
    /// was removed.
    pub fn delete_row(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(pos) => {
                self.rows.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Inserts a copy right after the source row and returns the copy's id.
    pub fn duplicate_row(&mut self, id: &str) -> Option<String> {
        let pos = self.position(id)?;
        let copy = self.with_unique_id(self.rows[pos].duplicate());
        let copy_id = copy.id.clone();
        self.rows.insert(pos + 1, copy);
        Some(copy_id)
    }

    /// Overwrites the lifecycle status of a row. Returns whether it exists.
    pub fn set_status(&mut self, id: &str, status: RowStatus) -> bool {
        match self.rows.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.status = status;
                true
            }
            None => false,
        }
    }

    /// Validates the row as it is right now and claims it for dispatch.
    ///
    /// On success the row moves to `uploading` and its current contents are
    /// returned; on failure the row moves to `error` with the rule's message.
    /// `None` means the row no longer exists.
    pub fn begin_dispatch(&mut self, id: &str) -> Option<Result<DraftRecord, ValidationError>> {
        let record = self.rows.iter_mut().find(|r| r.id == id)?;
        match validate(record) {
            Ok(()) => {
                record.status = RowStatus::Uploading;
                Some(Ok(record.clone()))
            }
            Err(e) => {
                record.status = RowStatus::error(e.to_string());
                Some(Err(e))
            }
        }
    }

    /// Discards every row and starts over with `count` empty ones.
    pub fn reset(&mut self, count: usize) {
        self.rows.clear();
        self.add_empty_rows(count);
    }

    /// Appends externally built records (e.g. parsed from a template) as
    /// pending rows, re-keying any id that is already taken.
    pub fn append_records(&mut self, records: Vec<DraftRecord>) -> Vec<String> {
        let mut ids = Vec::with_capacity(records.len());
        for mut record in records {
            record.status = RowStatus::Pending;
            let record = self.with_unique_id(record);
            ids.push(record.id.clone());
            self.rows.push(record);
        }
        ids
    }

    /// Rows that pass the loose pre-filter, in store order.
    ///
    /// Rows that already succeeded are skipped so a re-run never creates the
    /// same product twice.
    pub fn candidates(&self) -> Vec<Candidate> {
        self.rows
            .iter()
            .filter(|r| r.status != RowStatus::Success && is_candidate(r))
            .enumerate()
            .map(|(index, record)| Candidate {
                index,
                record: record.clone(),
            })
            .collect()
    }

    /// True when ids are pairwise distinct.
    pub fn ids_are_unique(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.rows.len());
        self.rows.iter().all(|r| seen.insert(r.id.as_str()))
    }
}

/// Thread-safe handle to a `RowStore`. Cloning is cheap (inner `Arc`).
#[derive(Debug, Clone)]
pub struct SharedRowStore {
    inner: Arc<RwLock<RowStore>>,
}

impl SharedRowStore {
    pub fn new(count: usize) -> Self {
        Self::from_store(RowStore::new(count))
    }

    pub fn from_store(store: RowStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RowStore> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Row store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, RowStore> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Row store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Copies the current rows out for rendering.
    pub fn snapshot(&self) -> Vec<DraftRecord> {
        self.read().rows().to_vec()
    }

    pub fn get(&self, id: &str) -> Option<DraftRecord> {
        self.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn add_empty_rows(&self, count: usize) -> Vec<String> {
        self.write().add_empty_rows(count)
    }

    pub fn update_field(&self, id: &str, field: DraftField) -> EditOutcome {
        let outcome = self.write().update_field(id, field);
        if outcome == EditOutcome::Locked {
            log::debug!("Edit to row {} refused while it is uploading", id);
        }
        outcome
    }

    pub fn delete_row(&self, id: &str) -> bool {
        self.write().delete_row(id)
    }

    pub fn duplicate_row(&self, id: &str) -> Option<String> {
        self.write().duplicate_row(id)
    }

    pub fn set_status(&self, id: &str, status: RowStatus) -> bool {
        self.write().set_status(id, status)
    }

    pub fn begin_dispatch(&self, id: &str) -> Option<Result<DraftRecord, ValidationError>> {
        self.write().begin_dispatch(id)
    }

    pub fn reset(&self, count: usize) {
        self.write().reset(count)
    }

    pub fn append_records(&self, records: Vec<DraftRecord>) -> Vec<String> {
        self.write().append_records(records)
    }

    pub fn candidates(&self) -> Vec<Candidate> {
        self.read().candidates()
    }

    pub fn ids_are_unique(&self) -> bool {
        self.read().ids_are_unique()
    }
}

impl Default for SharedRowStore {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_COUNT)
    }
}
