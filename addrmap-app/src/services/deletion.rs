//! Record deletion
//!
//! Removes a record by position from the map's list and writes the remaining
//! collection back. The removal is visible in the controller immediately; the
//! store reflects it on the next load once the save succeeds.

use crate::services::map_sync::MapSyncController;
use addrmap_common::events::AppEvent;
use addrmap_common::{KeyValueStore, StoreError};
use chrono::Utc;
use tracing::{info, warn};

impl<S: KeyValueStore> MapSyncController<S> {
    /// Delete the record at `index` and persist the shortened collection
    ///
    /// # Panics
    /// If `index` is out of range. Indices come from [`Self::record_list`],
    /// so a bad one is a caller bug.
    pub async fn delete_at(&mut self, index: usize) -> Result<(), StoreError> {
        assert!(
            index < self.records.len(),
            "delete index {} out of range for {} records",
            index,
            self.records.len()
        );

        let removed = self.records.remove(index);

        if let Err(e) = self.store.save(&self.records).await {
            warn!(index, name = %removed.name, error = %e, "Could not persist deletion");
            return Err(e);
        }

        info!(index, name = %removed.name, remaining = self.records.len(), "Record deleted");

        if let Some(bus) = &self.event_bus {
            bus.emit_lossy(AppEvent::RecordDeleted {
                index,
                name: removed.name,
                timestamp: Utc::now(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use addrmap_common::{Coordinate, FormFields, MemoryKeyValueStore, RecordStore, UserRecord};
    use std::sync::Arc;

    use super::*;

    fn record(name: &str) -> UserRecord {
        let form = FormFields::new(name, "Rua", "1", "Cidade", "UF");
        UserRecord::from_form(&form, Coordinate::new(1.0, 2.0).unwrap())
    }

    #[tokio::test]
    async fn test_delete_first_of_three() {
        let backend = Arc::new(MemoryKeyValueStore::new());
        let store = RecordStore::new(backend.clone());
        store
            .save(&[record("A"), record("B"), record("C")])
            .await
            .unwrap();

        let mut controller = MapSyncController::new(RecordStore::new(backend), 0.01);
        controller.reload().await;
        controller.delete_at(0).await.unwrap();

        let names: Vec<_> = controller.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C"]);
        assert_eq!(store.load().await.unwrap(), vec![record("B"), record("C")]);
    }

    #[tokio::test]
    #[should_panic(expected = "out of range")]
    async fn test_delete_out_of_range_panics() {
        let mut controller =
            MapSyncController::new(RecordStore::new(MemoryKeyValueStore::new()), 0.01);
        let _ = controller.delete_at(0).await;
    }
}
