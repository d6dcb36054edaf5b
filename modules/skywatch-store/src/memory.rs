use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use skywatch_common::ExtractionRecord;

use crate::error::Result;
use crate::{RecordStore, UpsertOutcome};

/// In-memory record store with the same keyed-upsert semantics as `PgStore`.
/// Used by tests and dry runs; the map mutex makes check-then-insert atomic
/// per key.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, ExtractionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, tweet_id: &str) -> Option<ExtractionRecord> {
        self.records.lock().unwrap().get(tweet_id).cloned()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn exists(&self, tweet_id: &str) -> Result<bool> {
        Ok(self.records.lock().unwrap().contains_key(tweet_id))
    }

    async fn insert(&self, record: &ExtractionRecord) -> Result<UpsertOutcome> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&record.tweet_id) {
            return Ok(UpsertOutcome::DuplicateSkipped);
        }
        records.insert(record.tweet_id.clone(), record.clone());
        Ok(UpsertOutcome::Inserted)
    }

    async fn update_coordinates(
        &self,
        tweet_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.get_mut(tweet_id) {
            record.latitude = Some(latitude);
            record.longitude = Some(longitude);
        }
        Ok(())
    }

    async fn missing_coordinates(&self) -> Result<Vec<ExtractionRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .values()
            .filter(|r| r.wants_geocoding())
            .cloned()
            .collect())
    }
}
