//! Test Helper Utilities
//!
//! Scripted geocoders and store backends for exercising the workflow and
//! the map controller without network or disk.

#![allow(dead_code)]

use addrmap_app::services::{GeocodeError, Geocoder};
use addrmap_common::{
    Coordinate, FormFields, KeyValueStore, MemoryKeyValueStore, RecordStore, UserRecord,
};
use async_trait::async_trait;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Geocoder answering every query with the same scripted result
pub struct StubGeocoder {
    response: Result<Vec<Coordinate>, GeocodeError>,
    queries: Mutex<Vec<String>>,
}

impl StubGeocoder {
    pub fn returning(candidates: &[(f64, f64)]) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(candidates
                .iter()
                .map(|(lat, lon)| Coordinate::new(*lat, *lon).unwrap())
                .collect()),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Err(GeocodeError::ServiceFailure(message.to_string())),
            queries: Mutex::new(Vec::new()),
        })
    }

    /// Address lines received so far
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn geocode(&self, address_line: &str) -> Result<Vec<Coordinate>, GeocodeError> {
        self.queries.lock().unwrap().push(address_line.to_string());
        self.response.clone()
    }
}

/// In-memory backend whose writes can be switched off
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryKeyValueStore,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::Other, "disk unplugged"));
        }
        self.inner.get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
        }
        self.inner.set_item(key, value).await
    }
}

pub fn ana_form() -> FormFields {
    FormFields::new("Ana", "Rua Teste", "10", "São Paulo", "SP")
}

pub fn record(name: &str, lat: f64, lon: f64) -> UserRecord {
    let form = FormFields::new(name, format!("Rua {}", name), "1", "Cidade", "UF");
    UserRecord::from_form(&form, Coordinate::new(lat, lon).unwrap())
}

/// Seed `backend` with `records` through a record store
pub async fn seed<S: KeyValueStore>(backend: S, records: &[UserRecord]) {
    RecordStore::new(backend).save(records).await.unwrap();
}
