//! Data models for addrmap-app

pub mod map;
pub mod registration_session;

pub use map::{MapViewState, Marker, RecordListEntry, Region};
pub use registration_session::{RegistrationSession, RegistrationState, StateTransition};
