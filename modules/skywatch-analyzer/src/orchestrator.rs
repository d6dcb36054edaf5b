use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use geocode_client::Geocoder;
use inference_client::Inference;
use skywatch_common::{ExtractionRecord, SocialPost};
use skywatch_store::{RecordStore, UpsertOutcome};

use crate::pipeline::TweetAnalyzer;
use crate::resolver::GeocodeResolver;

const DEFAULT_WORKERS: usize = 5;
const DEFAULT_CHUNK_SIZE: usize = 100;
const DEFAULT_CHUNK_PAUSE: Duration = Duration::from_secs(300);

/// Stats from one classification batch.
#[derive(Debug, Default)]
pub struct BatchStats {
    pub posts_seen: u32,
    pub already_processed: u32,
    pub dropped: u32,
    pub inserted: u32,
    pub duplicates_skipped: u32,
    pub store_failures: u32,
}

impl std::fmt::Display for BatchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Batch Complete ===")?;
        writeln!(f, "Posts seen:          {}", self.posts_seen)?;
        writeln!(f, "Already processed:   {}", self.already_processed)?;
        writeln!(f, "Dropped (no data):   {}", self.dropped)?;
        writeln!(f, "Records inserted:    {}", self.inserted)?;
        writeln!(f, "Duplicates skipped:  {}", self.duplicates_skipped)?;
        writeln!(f, "Store failures:      {}", self.store_failures)?;
        Ok(())
    }
}

/// Stats from the geocoding pass.
#[derive(Debug, Default)]
pub struct GeocodeStats {
    pub attempted: u32,
    pub resolved: u32,
    pub unresolved: u32,
    pub update_failures: u32,
}

impl std::fmt::Display for GeocodeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Geocode Pass Complete ===")?;
        writeln!(f, "Locations attempted: {}", self.attempted)?;
        writeln!(f, "Resolved:            {}", self.resolved)?;
        writeln!(f, "Unresolved:          {}", self.unresolved)?;
        writeln!(f, "Update failures:     {}", self.update_failures)?;
        Ok(())
    }
}

enum PostOutcome {
    Analyzed(Box<ExtractionRecord>),
    AlreadySeen,
    Dropped,
}

/// Fans posts out across concurrent pipeline workers chunk by chunk, then
/// writes each chunk's results through a single sequential writer. A later,
/// much more strictly throttled pass geocodes stored records that still
/// lack coordinates.
pub struct BatchOrchestrator<I, G, S>
where
    I: Inference,
    G: Geocoder,
    S: RecordStore,
{
    analyzer: TweetAnalyzer<I>,
    resolver: GeocodeResolver<G>,
    store: S,
    workers: usize,
    chunk_size: usize,
    chunk_pause: Duration,
}

impl<I, G, S> BatchOrchestrator<I, G, S>
where
    I: Inference,
    G: Geocoder,
    S: RecordStore,
{
    pub fn new(analyzer: TweetAnalyzer<I>, resolver: GeocodeResolver<G>, store: S) -> Self {
        Self {
            analyzer,
            resolver,
            store,
            workers: DEFAULT_WORKERS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_pause: DEFAULT_CHUNK_PAUSE,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_chunk_pause(mut self, pause: Duration) -> Self {
        self.chunk_pause = pause;
        self
    }

    /// Run the extraction pipeline over a batch. One post's failure never
    /// aborts the rest: exhausted posts are dropped, store faults are
    /// counted, duplicates are skipped.
    pub async fn process(&self, posts: &[SocialPost]) -> BatchStats {
        let mut stats = BatchStats {
            posts_seen: posts.len() as u32,
            ..Default::default()
        };

        for (index, chunk) in posts.chunks(self.chunk_size).enumerate() {
            if index > 0 {
                info!(
                    pause_secs = self.chunk_pause.as_secs(),
                    "Pausing between chunks"
                );
                tokio::time::sleep(self.chunk_pause).await;
            }
            info!(chunk = index, posts = chunk.len(), "Processing chunk");

            // Analyze in parallel; each worker is a pure function of one post.
            let outcomes: Vec<(String, PostOutcome)> =
                stream::iter(chunk.iter().map(|post| async move {
                    match self.store.exists(&post.id).await {
                        Ok(true) => return (post.id.clone(), PostOutcome::AlreadySeen),
                        Ok(false) => {}
                        Err(e) => {
                            warn!(tweet_id = %post.id, error = %e, "Exists check failed, analyzing anyway");
                        }
                    }
                    match self.analyzer.analyze(post).await {
                        Some(record) => (post.id.clone(), PostOutcome::Analyzed(Box::new(record))),
                        None => (post.id.clone(), PostOutcome::Dropped),
                    }
                }))
                .buffer_unordered(self.workers)
                .collect()
                .await;

            // Persist sequentially; the store's keyed upsert is the only
            // serialization point.
            for (tweet_id, outcome) in outcomes {
                match outcome {
                    PostOutcome::Analyzed(record) => match self.store.insert(&record).await {
                        Ok(UpsertOutcome::Inserted) => stats.inserted += 1,
                        Ok(UpsertOutcome::DuplicateSkipped) => {
                            info!(tweet_id = tweet_id.as_str(), "Duplicate record, insert skipped");
                            stats.duplicates_skipped += 1;
                        }
                        Err(e) => {
                            warn!(tweet_id = tweet_id.as_str(), error = %e, "Insert failed");
                            stats.store_failures += 1;
                        }
                    },
                    PostOutcome::AlreadySeen => {
                        stats.already_processed += 1;
                    }
                    PostOutcome::Dropped => {
                        warn!(tweet_id = tweet_id.as_str(), "Post dropped, no validated response");
                        stats.dropped += 1;
                    }
                }
            }
        }

        stats
    }

    /// Geocode every stored record that still lacks coordinates. Sequential
    /// on purpose: the geocoding service is throttled far harder than the
    /// inference service and must not hold classification back.
    pub async fn geocode_missing(&self) -> GeocodeStats {
        let mut stats = GeocodeStats::default();

        let records = match self.store.missing_coordinates().await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Could not list records missing coordinates");
                return stats;
            }
        };
        info!(count = records.len(), "Geocoding stored records");

        for record in records {
            stats.attempted += 1;
            match self.resolver.resolve(&record.location).await {
                Some(coordinates) => {
                    match self
                        .store
                        .update_coordinates(
                            &record.tweet_id,
                            coordinates.latitude,
                            coordinates.longitude,
                        )
                        .await
                    {
                        Ok(()) => stats.resolved += 1,
                        Err(e) => {
                            warn!(tweet_id = %record.tweet_id, error = %e, "Coordinate update failed");
                            stats.update_failures += 1;
                        }
                    }
                }
                None => stats.unresolved += 1,
            }
        }

        stats
    }
}
