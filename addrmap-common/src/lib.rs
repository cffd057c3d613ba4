//! # addrmap Common Library
//!
//! Shared code for the addrmap crates:
//! - Record model and registration form input
//! - Accent normalization for geocoder queries
//! - Key-value backed record store
//! - Lifecycle events (EventBus)
//! - Configuration loading

pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod normalize;
pub mod store;

pub use error::{Error, Result, StoreError};
pub use models::{Coordinate, FormFields, UserRecord};
pub use store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, RecordStore};
