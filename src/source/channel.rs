//! Channel-based data source.
//!
//! Receives snapshots published by the [`SensorStore`](crate::data::SensorStore)
//! through a tokio watch channel.

use tokio::sync::watch;

use super::DataSource;
use crate::data::Snapshot;

/// A data source fed by a store subscription.
///
/// # Example
///
/// ```
/// use turbidity_watch::data::SensorStore;
/// use turbidity_watch::{ChannelSource, DataSource};
///
/// let store = SensorStore::seeded();
/// let mut source = ChannelSource::new(store.subscribe(), "mock feed");
///
/// // The first poll yields the seed snapshot
/// assert_eq!(source.poll().unwrap().len(), store.len());
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Snapshot>,
    description: String,
    /// Track if we've returned the initial value yet
    initial_returned: bool,
    last_error: Option<String>,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiving end of a store subscription
    /// * `source_description` - Where snapshots come from (e.g. "mock feed")
    pub fn new(receiver: watch::Receiver<Snapshot>, source_description: &str) -> Self {
        let description = format!("live: {}", source_description);
        Self {
            receiver,
            description,
            initial_returned: false,
            last_error: None,
        }
    }

    /// Create a channel pair for pushing snapshots by hand.
    ///
    /// Returns (sender, source).
    pub fn create(source_description: &str) -> (watch::Sender<Snapshot>, Self) {
        let (tx, rx) = watch::channel(Snapshot::new());
        let source = Self::new(rx, source_description);
        (tx, source)
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<Snapshot> {
        // Return the initial value on first poll
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        match self.receiver.has_changed() {
            Ok(true) => {
                self.last_error = None;
                Some(self.receiver.borrow_and_update().clone())
            }
            Ok(false) => None,
            Err(_) => {
                self.last_error = Some("Feed stopped".to_string());
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
