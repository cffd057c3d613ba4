//! Map sync controller
//!
//! Keeps the marker set in line with the persisted collection. The controller
//! never diffs: on initial activation and on every return to the map it loads
//! the whole collection and replaces its list. A failing load shows no
//! markers instead of blocking the view.

use crate::models::{MapViewState, Marker, RecordListEntry, Region};
use crate::services::location::LocationProvider;
use addrmap_common::events::{AppEvent, EventBus, View};
use addrmap_common::{Coordinate, KeyValueStore, RecordStore, UserRecord};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Map-side state: records, device position and camera
pub struct MapSyncController<S> {
    pub(crate) store: RecordStore<S>,
    pub(crate) records: Vec<UserRecord>,
    pub(crate) event_bus: Option<EventBus>,
    position: Option<Result<Coordinate, String>>,
    viewport: Option<Region>,
    zoom_delta: f64,
    reload_count: u64,
}

impl<S: KeyValueStore> MapSyncController<S> {
    /// `zoom_delta` is the camera span used by every centering command
    pub fn new(store: RecordStore<S>, zoom_delta: f64) -> Self {
        Self {
            store,
            records: Vec::new(),
            event_bus: None,
            position: None,
            viewport: None,
            zoom_delta,
            reload_count: 0,
        }
    }

    /// Publish deletion events on `bus`
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Initial mount: read the device position, place the camera, load records
    pub async fn activate(&mut self, location: &dyn LocationProvider) {
        match location.current_position().await {
            Ok(position) => {
                info!(
                    latitude = position.latitude,
                    longitude = position.longitude,
                    "Device position acquired"
                );
                self.viewport = Some(Region::around(position, self.zoom_delta));
                self.position = Some(Ok(position));
            }
            Err(message) => {
                warn!(error = %message, "Device position unavailable");
                self.position = Some(Err(message));
            }
        }

        self.reload().await;
    }

    /// Replace the in-memory list with the persisted collection
    ///
    /// Returns the number of records now held.
    pub async fn reload(&mut self) -> usize {
        self.records = self.store.load_or_empty().await;
        self.reload_count += 1;
        debug!(
            count = self.records.len(),
            reload = self.reload_count,
            "Map records reloaded"
        );
        self.records.len()
    }

    /// The map became the active view again
    pub async fn on_focus(&mut self) {
        self.reload().await;
    }

    /// React to lifecycle events; only map activation matters here
    pub async fn handle_event(&mut self, event: &AppEvent) {
        if event.activates(View::Map) {
            self.on_focus().await;
        }
    }

    pub fn records(&self) -> &[UserRecord] {
        &self.records
    }

    /// Number of reloads performed so far
    pub fn reload_count(&self) -> u64 {
        self.reload_count
    }

    /// One marker per record, in collection order
    pub fn markers(&self) -> Vec<Marker> {
        self.records.iter().map(Marker::from_record).collect()
    }

    /// "You are here" marker
    pub fn position_marker(&self) -> Option<Marker> {
        match &self.position {
            Some(Ok(position)) => Some(Marker {
                title: "You are here".to_string(),
                description: String::new(),
                coordinate: *position,
            }),
            _ => None,
        }
    }

    pub fn viewport(&self) -> Option<Region> {
        self.viewport
    }

    pub fn view_state(&self) -> MapViewState {
        match &self.position {
            None => MapViewState::Loading,
            Some(Err(message)) => MapViewState::LocationError(message.clone()),
            Some(Ok(_)) => MapViewState::Ready,
        }
    }

    /// Rows for the record list, tap to focus, trash to delete
    pub fn record_list(&self) -> Vec<RecordListEntry> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| RecordListEntry {
                index,
                name: record.name.clone(),
            })
            .collect()
    }

    /// Center the camera on a point with the fixed zoom span
    pub fn focus_on(&mut self, latitude: f64, longitude: f64) {
        self.viewport = Some(Region::around(
            Coordinate {
                latitude,
                longitude,
            },
            self.zoom_delta,
        ));
        debug!(latitude, longitude, "Camera centered");
    }

    /// Center on the record at `index`; false if there is no such record
    pub fn select(&mut self, index: usize) -> bool {
        let Some(record) = self.records.get(index) else {
            return false;
        };
        let (latitude, longitude) = (record.latitude, record.longitude);
        self.focus_on(latitude, longitude);
        true
    }
}

/// Live subscription feeding map activation events to a controller
///
/// Dropping it stops the listener.
pub struct FocusSubscription {
    handle: JoinHandle<()>,
}

impl FocusSubscription {
    pub fn unsubscribe(self) {
        self.handle.abort();
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for FocusSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Reload `controller` every time the map view becomes active on `bus`
pub fn subscribe_focus<S>(
    controller: Arc<Mutex<MapSyncController<S>>>,
    bus: &EventBus,
) -> FocusSubscription
where
    S: KeyValueStore + 'static,
{
    let mut rx = bus.subscribe();

    let handle = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => controller.lock().await.handle_event(&event).await,
                Err(RecvError::Lagged(skipped)) => {
                    // A missed activation is possible; reloading is always safe
                    warn!(skipped, "Focus listener lagged, reloading");
                    controller.lock().await.on_focus().await;
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!("Focus listener stopped");
    });

    FocusSubscription { handle }
}
