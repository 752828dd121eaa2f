//! Data source abstraction for receiving sensor snapshots.
//!
//! The TUI never reads the store directly. It polls a [`DataSource`], which
//! is either the live store subscription ([`ChannelSource`]) or a replay of a
//! previously exported JSON document ([`FileSource`]).

mod channel;
mod file;

pub use channel::ChannelSource;
pub use file::FileSource;

use std::fmt::Debug;

use crate::data::Snapshot;

/// Trait for receiving sensor snapshots from various sources.
///
/// # Example
///
/// ```
/// use turbidity_watch::{DataSource, FileSource};
///
/// let mut source = FileSource::new("turbidity-sensors.json");
/// if let Some(snapshot) = source.poll() {
///     println!("Got {} sensors", snapshot.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest snapshot.
    ///
    /// Returns `Some(snapshot)` if new data is available, `None` otherwise.
    /// This method must not block.
    fn poll(&mut self) -> Option<Snapshot>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Check if the source has encountered an error.
    ///
    /// Returns the error message if an error occurred during the last poll.
    fn error(&self) -> Option<&str>;
}
