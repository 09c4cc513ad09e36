//! Event types for the gigwatch event system
//!
//! Provides the shared event definitions and the EventBus used to fan state
//! changes out to whoever is listening (CLI watch loop, tests).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// gigwatch event types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TrackerEvent {
    /// Band library changed (add, import, remove, favorite toggle)
    BandsChanged {
        band_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A refresh replaced the concert collection
    ConcertsRefreshed {
        concert_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A refresh failed; existing concerts were kept
    RefreshFailed {
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Reminder timers were recomputed
    RemindersScheduled {
        /// Number of live timers after the recompute
        scheduled: usize,
        timestamp: DateTime<Utc>,
    },

    /// A reminder timer fired
    ReminderFired {
        concert_id: String,
        band_name: String,
        timestamp: DateTime<Utc>,
    },
}

/// Broadcast bus for [`TrackerEvent`]s
///
/// Cloning the bus shares the same channel.
///
/// # Examples
///
/// ```
/// use gigwatch_common::events::{EventBus, TrackerEvent};
///
/// let bus = EventBus::new(16);
/// let mut rx = bus.subscribe();
/// bus.emit(TrackerEvent::BandsChanged { band_count: 3, timestamp: chrono::Utc::now() }).ok();
/// assert!(matches!(rx.try_recv(), Ok(TrackerEvent::BandsChanged { band_count: 3, .. })));
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TrackerEvent>,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per receiver
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)`, or `Err` when nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: TrackerEvent,
    ) -> Result<usize, broadcast::error::SendError<TrackerEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the no-subscriber case
    pub fn emit_lossy(&self, event: TrackerEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("No subscribers for tracker event");
        }
    }
}
