//! File-backed record store behaviour

use addrmap_common::store::USERS_KEY;
use addrmap_common::{
    Coordinate, FileKeyValueStore, FormFields, KeyValueStore, MemoryKeyValueStore, RecordStore,
    StoreError, UserRecord,
};
use std::sync::Arc;
use tempfile::TempDir;

fn record(name: &str, lat: f64, lon: f64) -> UserRecord {
    let form = FormFields::new(name, "Rua Teste", "10", "São Paulo", "SP");
    UserRecord::from_form(&form, Coordinate::new(lat, lon).unwrap())
}

#[tokio::test]
async fn test_fresh_folder_loads_empty() {
    let dir = TempDir::new().unwrap();
    let store = RecordStore::new(FileKeyValueStore::new(dir.path().join("store")));

    assert!(store.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_save_then_load_preserves_order_and_fields() {
    let dir = TempDir::new().unwrap();
    let store = RecordStore::new(FileKeyValueStore::new(dir.path().join("store")));

    let records = vec![
        record("Ana", -23.5, -46.6),
        record("Bruno", -22.9, -43.2),
        record("Célia", 0.0, 0.0),
    ];
    store.save(&records).await.unwrap();

    assert_eq!(store.load().await.unwrap(), records);
}

#[tokio::test]
async fn test_save_of_loaded_collection_leaves_bytes_unchanged() {
    let dir = TempDir::new().unwrap();
    let backend = FileKeyValueStore::new(dir.path().join("store"));
    let store = RecordStore::new(backend.clone());

    store
        .save(&[
            record("Ana", -23.5, -46.6),
            record("Bruno", 12.25, 100.125),
            record("Carla", -3.4941826710914796, -111.97804110201159),
            record("Davi", 89.99999999999999, -179.99999999999997),
        ])
        .await
        .unwrap();
    let before = backend.get_item(USERS_KEY).await.unwrap();

    let loaded = store.load().await.unwrap();
    store.save(&loaded).await.unwrap();
    let after = backend.get_item(USERS_KEY).await.unwrap();

    assert_eq!(before, after);
}

#[tokio::test]
async fn test_full_precision_coordinates_load_exactly() {
    let backend = Arc::new(MemoryKeyValueStore::new());
    let store = RecordStore::new(backend.clone());

    // Deterministic spread of 17-significant-digit coordinates
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let mut next = || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    let expected: Vec<(f64, f64)> = (0..2000)
        .map(|_| (next() * 180.0 - 90.0, next() * 360.0 - 180.0))
        .collect();

    let body = expected
        .iter()
        .map(|(lat, lon)| {
            format!(
                r#"{{"nome":"","rua":"R","numero":"","cidade":"C","estado":"E","latitude":{:?},"longitude":{:?}}}"#,
                lat, lon
            )
        })
        .collect::<Vec<_>>()
        .join(",");
    backend
        .set_item(USERS_KEY, &format!("[{}]", body))
        .await
        .unwrap();

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded.len(), expected.len());
    for (record, (lat, lon)) in loaded.iter().zip(&expected) {
        assert_eq!(record.latitude.to_bits(), lat.to_bits());
        assert_eq!(record.longitude.to_bits(), lon.to_bits());
    }
}

#[tokio::test]
async fn test_write_leaves_no_temp_file() {
    let dir = TempDir::new().unwrap();
    let backend = FileKeyValueStore::new(dir.path().join("store"));
    let store = RecordStore::new(backend.clone());

    store.save(&[record("Ana", -23.5, -46.6)]).await.unwrap();

    let target = backend.item_path(USERS_KEY);
    assert!(target.exists());
    assert!(!target.with_extension("json.tmp").exists());
}

#[tokio::test]
async fn test_reads_value_written_by_other_clients() {
    let dir = TempDir::new().unwrap();
    let backend = FileKeyValueStore::new(dir.path());
    std::fs::write(
        backend.item_path(USERS_KEY),
        r#"[{"nome":"Ana","rua":"Rua Teste","numero":"10","cidade":"São Paulo","estado":"SP","latitude":-23.5,"longitude":-46.6}]"#,
    )
    .unwrap();

    let records = RecordStore::new(backend).load().await.unwrap();
    assert_eq!(records, vec![record("Ana", -23.5, -46.6)]);
}

#[tokio::test]
async fn test_corrupt_file_is_reported_not_overwritten_by_load() {
    let dir = TempDir::new().unwrap();
    let backend = FileKeyValueStore::new(dir.path());
    std::fs::write(backend.item_path(USERS_KEY), "garbage").unwrap();

    let store = RecordStore::new(backend.clone());
    assert!(matches!(store.load().await, Err(StoreError::Corrupt(_))));
    assert!(store.load_or_empty().await.is_empty());

    // Reading never rewrites the value
    assert_eq!(
        std::fs::read_to_string(backend.item_path(USERS_KEY)).unwrap(),
        "garbage"
    );
}

#[tokio::test]
async fn test_invalid_record_is_never_persisted() {
    let dir = TempDir::new().unwrap();
    let backend = FileKeyValueStore::new(dir.path());
    let store = RecordStore::new(backend.clone());

    let mut bad = record("Ana", 0.0, 0.0);
    bad.latitude = 95.0;

    assert!(matches!(
        store.save(&[bad]).await,
        Err(StoreError::WriteFailure(_))
    ));
    assert!(!backend.item_path(USERS_KEY).exists());
}
