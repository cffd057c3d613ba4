//! Services: geocoding, registration, map sync, deletion, navigation

pub mod deletion;
pub mod geocoder;
pub mod location;
pub mod map_sync;
pub mod navigation;
pub mod registration;

pub use geocoder::{GeocodeError, Geocoder, NominatimGeocoder};
pub use location::{FixedLocation, LocationProvider};
pub use map_sync::{subscribe_focus, FocusSubscription, MapSyncController};
pub use navigation::Navigator;
pub use registration::{RegistrationWorkflow, ValidationError, WorkflowOutcome};
