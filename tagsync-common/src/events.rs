//! Event types for the tagsync event system
//!
//! Provides the shared event definitions and an EventBus for broadcasting them.
//! The tag engine never publishes directly: operations return the event they
//! produced and the caller dispatches it here.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Old and new rendering of one changed tag field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Field name, e.g. "Title"
    pub field: String,
    /// Value on disk before the write
    pub old: String,
    /// Value written
    pub new: String,
}

/// tagsync event types
///
/// Events are broadcast via EventBus and can be serialized for external consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TagSyncEvent {
    /// Tags of a tracked file were rewritten
    ///
    /// Emitted exactly once per write that reached the disk, never for skipped
    /// or deferred writes.
    TrackRetagged {
        /// Host record identity
        track_file_id: Uuid,
        /// File that was rewritten
        path: PathBuf,
        /// Fields that differed between disk and catalog
        changes: Vec<FieldChange>,
        /// Whether existing tags were stripped before the write
        scrubbed: bool,
        /// When the write completed
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Central event distribution bus
///
/// Thin wrapper over a tokio broadcast channel. Cloning shares the channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TagSyncEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    ///
    /// # Examples
    ///
    /// ```
    /// use tagsync_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.capacity(), 100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<TagSyncEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: TagSyncEvent,
    ) -> Result<usize, broadcast::error::SendError<TagSyncEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: TagSyncEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
