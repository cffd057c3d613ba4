//! Application lifecycle and navigation events
//!
//! Screens never call each other directly. The registration form signals
//! "go back" when it is done, the navigation layer announces which view became
//! active, and the map view reloads its records when it sees itself activated.
//! All of it travels over one [`EventBus`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Views the application can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Map with record markers and the device position
    Map,
    /// Registration form
    Register,
}

/// Application events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AppEvent {
    /// A view became the active one (initial mount or return from another view)
    ViewActivated {
        view: View,
        timestamp: DateTime<Utc>,
    },

    /// A view finished its job and asks to return to the previous one
    NavigateBack {
        from: View,
        timestamp: DateTime<Utc>,
    },

    /// A record was appended to the store
    RecordRegistered {
        name: String,
        latitude: f64,
        longitude: f64,
        timestamp: DateTime<Utc>,
    },

    /// The record at `index` was removed from the store
    RecordDeleted {
        index: usize,
        name: String,
        timestamp: DateTime<Utc>,
    },
}

impl AppEvent {
    pub fn view_activated(view: View) -> Self {
        AppEvent::ViewActivated {
            view,
            timestamp: Utc::now(),
        }
    }

    pub fn navigate_back(from: View) -> Self {
        AppEvent::NavigateBack {
            from,
            timestamp: Utc::now(),
        }
    }

    /// True if this event means `view` just became active
    pub fn activates(&self, view: View) -> bool {
        matches!(self, AppEvent::ViewActivated { view: v, .. } if *v == view)
    }
}

/// Event distribution over a tokio broadcast channel
///
/// Publishing never blocks; a slow subscriber lags and loses the oldest
/// events instead of stalling the producer.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` undelivered events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Receive every event emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, `Err` if nobody is listening
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: AppEvent) -> Result<usize, broadcast::error::SendError<AppEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the no-subscriber case
    pub fn emit_lossy(&self, event: AppEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
