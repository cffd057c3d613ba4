//! Map view types

use addrmap_common::{Coordinate, UserRecord};
use serde::{Deserialize, Serialize};

/// Pin drawn for one stored record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub title: String,
    pub description: String,
    pub coordinate: Coordinate,
}

impl Marker {
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            title: record.name.clone(),
            description: record.description(),
            coordinate: Coordinate {
                latitude: record.latitude,
                longitude: record.longitude,
            },
        }
    }
}

/// Camera viewport: a center and a fixed span in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: Coordinate,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Region {
    pub fn around(center: Coordinate, delta: f64) -> Self {
        Self {
            center,
            latitude_delta: delta,
            longitude_delta: delta,
        }
    }
}

/// What the map screen can show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapViewState {
    /// Waiting for the device position
    Loading,
    /// Position lookup failed; the message replaces the map
    LocationError(String),
    /// Map with markers
    Ready,
}

/// Row of the deletable record list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordListEntry {
    pub index: usize,
    pub name: String,
}
