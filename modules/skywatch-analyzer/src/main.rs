use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use geocode_client::GeocodeClient;
use inference_client::InferenceClient;
use skywatch_analyzer::{BatchOrchestrator, GeocodeResolver, TweetAnalyzer};
use skywatch_common::Config;
use skywatch_store::{PgStore, PostSource};

/// Classify one day of collected posts and geocode the results.
#[derive(Parser, Debug)]
#[command(name = "skywatch-analyzer")]
struct Args {
    /// Day to analyze (yyyy-mm-dd), matching the ingestion window.
    #[arg(long)]
    date: NaiveDate,

    /// Run classification only, leaving the geocoding pass for later.
    #[arg(long)]
    skip_geocode: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("skywatch=info".parse()?))
        .init();

    let args = Args::parse();
    let config = Config::from_env();

    info!("Skywatch analyzer starting...");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = PgStore::new(pool);
    store.migrate().await?;

    let posts = store.fetch_window(args.date).await?;
    info!(date = %args.date, posts = posts.len(), "Loaded ingestion window");

    let mut inference =
        InferenceClient::new(&config.inference_model).with_base_url(&config.inference_base_url);
    if let Some(ref key) = config.inference_api_key {
        inference = inference.with_api_key(key);
    }

    let geocoder = GeocodeClient::new()
        .with_base_url(&config.geocode_base_url)
        .with_min_interval(Duration::from_secs(config.geocode_interval_secs));

    let orchestrator = BatchOrchestrator::new(
        TweetAnalyzer::new(inference),
        GeocodeResolver::new(geocoder),
        store,
    )
    .with_workers(config.workers)
    .with_chunk_size(config.chunk_size)
    .with_chunk_pause(Duration::from_secs(config.chunk_pause_secs));

    let stats = orchestrator.process(&posts).await;
    info!("{stats}");

    if args.skip_geocode {
        info!("Skipping geocode pass");
        return Ok(());
    }

    let geocode_stats = orchestrator.geocode_missing().await;
    info!("{geocode_stats}");

    Ok(())
}
