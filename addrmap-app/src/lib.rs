//! addrmap-app library interface
//!
//! Address registration (validate, normalize, geocode, store) and the map
//! view's record sync, deletion and camera control. The `addrmap` binary is a
//! thin command-line front end over these services.

pub mod models;
pub mod services;

pub use models::{MapViewState, Marker, Region, RegistrationSession, RegistrationState};
pub use services::{
    FixedLocation, GeocodeError, Geocoder, LocationProvider, MapSyncController, Navigator,
    NominatimGeocoder, RegistrationWorkflow, WorkflowOutcome,
};
