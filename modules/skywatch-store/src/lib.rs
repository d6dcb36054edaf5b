pub mod error;
pub mod memory;
pub mod pg;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use pg::PgStore;

use async_trait::async_trait;
use chrono::NaiveDate;

use skywatch_common::{ExtractionRecord, SocialPost};

/// What happened to a keyed insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    /// The key already had a record; the write was a no-op.
    DuplicateSkipped,
}

/// Persistent store for extraction records, keyed uniquely by tweet id.
/// The duplicate check on insert must be atomic per key.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn exists(&self, tweet_id: &str) -> Result<bool>;

    /// Insert-if-absent. First writer wins; a duplicate is reported, not an
    /// error.
    async fn insert(&self, record: &ExtractionRecord) -> Result<UpsertOutcome>;

    /// Targeted coordinate update from the geocoding pass. Leaves every
    /// other field untouched.
    async fn update_coordinates(
        &self,
        tweet_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<()>;

    /// Genuine-disaster records with a usable location but no coordinates
    /// yet — the geocoding pass's work queue.
    async fn missing_coordinates(&self) -> Result<Vec<ExtractionRecord>>;
}

/// Batch input boundary: posts collected by the ingestion side for one day.
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_window(&self, day: NaiveDate) -> Result<Vec<SocialPost>>;
}

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for std::sync::Arc<T> {
    async fn exists(&self, tweet_id: &str) -> Result<bool> {
        (**self).exists(tweet_id).await
    }

    async fn insert(&self, record: &ExtractionRecord) -> Result<UpsertOutcome> {
        (**self).insert(record).await
    }

    async fn update_coordinates(
        &self,
        tweet_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<()> {
        (**self).update_coordinates(tweet_id, latitude, longitude).await
    }

    async fn missing_coordinates(&self) -> Result<Vec<ExtractionRecord>> {
        (**self).missing_coordinates().await
    }
}
