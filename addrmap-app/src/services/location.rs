//! Device position provider

use addrmap_common::config::LocationConfig;
use addrmap_common::Coordinate;
use async_trait::async_trait;

/// Source of the device's current position
///
/// Errors are plain user-facing strings ("permission denied", ...), shown
/// in place of the map.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinate, String>;
}

/// Position fixed at startup (config file or command line)
#[derive(Debug, Clone, Default)]
pub struct FixedLocation {
    position: Option<Coordinate>,
}

impl FixedLocation {
    pub fn new(position: Option<Coordinate>) -> Self {
        Self { position }
    }

    /// Build from the `[location]` config section, validating the ranges
    pub fn from_config(config: Option<&LocationConfig>) -> Result<Self, String> {
        let position = config
            .map(|c| Coordinate::new(c.latitude, c.longitude))
            .transpose()
            .map_err(|e| e.to_string())?;
        Ok(Self { position })
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinate, String> {
        self.position
            .ok_or_else(|| "Current position unavailable: no device location configured".to_string())
    }
}
