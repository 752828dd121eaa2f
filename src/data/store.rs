//! The sensor store: the single owned source of truth for sensor records.
//!
//! The store has exactly one writer (the feed task that owns it). Readers
//! never touch it directly; they [`subscribe`](SensorStore::subscribe) and
//! receive every published snapshot through a `watch` channel.

use std::collections::HashSet;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::watch;

use super::seed::default_fleet;
use super::sensor::{SensorRecord, Snapshot};

/// Errors raised when building or updating the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Two records share an identifier.
    #[error("Duplicate sensor id: {0}")]
    DuplicateId(String),

    /// An update carried a different number of records.
    #[error("Snapshot has {actual} records, store holds {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// An update reordered, renamed, added or removed a record.
    #[error("Record {index} is {actual}, expected {expected}")]
    IdMismatch {
        index: usize,
        expected: String,
        actual: String,
    },
}

/// Owned container for the current snapshot.
#[derive(Debug)]
pub struct SensorStore {
    records: Snapshot,
    sender: watch::Sender<Snapshot>,
}

impl SensorStore {
    /// Create a store from seed records.
    ///
    /// Fails if two records share an identifier.
    pub fn new(records: Vec<SensorRecord>) -> Result<Self, StoreError> {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.id.as_str()) {
                return Err(StoreError::DuplicateId(record.id.clone()));
            }
        }

        let (sender, _) = watch::channel(records.clone());
        Ok(Self { records, sender })
    }

    /// Create a store holding the default fleet.
    pub fn seeded() -> Self {
        let records = default_fleet(Utc::now());
        let (sender, _) = watch::channel(records.clone());
        Self { records, sender }
    }

    /// The latest snapshot, in insertion order.
    pub fn snapshot(&self) -> &[SensorRecord] {
        &self.records
    }

    /// Look up a record by identifier.
    pub fn get(&self, id: &str) -> Option<&SensorRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Subscribe to snapshot updates.
    ///
    /// The receiver starts out holding the current snapshot. Intermediate
    /// snapshots may be coalesced if the reader falls behind.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.sender.subscribe()
    }

    /// True once every subscriber has been dropped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Replace the snapshot and notify subscribers.
    ///
    /// Records are never created or deleted at runtime, so `next` must carry
    /// the same identifiers in the same order.
    pub fn replace(&mut self, next: Snapshot) -> Result<(), StoreError> {
        if next.len() != self.records.len() {
            return Err(StoreError::LengthMismatch {
                expected: self.records.len(),
                actual: next.len(),
            });
        }

        for (index, (current, incoming)) in self.records.iter().zip(&next).enumerate() {
            if current.id != incoming.id {
                return Err(StoreError::IdMismatch {
                    index,
                    expected: current.id.clone(),
                    actual: incoming.id.clone(),
                });
            }
        }

        self.records = next;
        self.sender.send_replace(self.records.clone());
        Ok(())
    }
}
