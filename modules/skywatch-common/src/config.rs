use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres
    pub database_url: String,

    // Inference service (OpenAI-compatible chat completions endpoint)
    pub inference_base_url: String,
    pub inference_model: String,
    pub inference_api_key: Option<String>,

    // Geocoding service
    pub geocode_base_url: String,
    /// Minimum seconds between geocoding requests.
    pub geocode_interval_secs: u64,

    // Batch orchestration
    pub workers: usize,
    pub chunk_size: usize,
    /// Seconds to pause between chunks to stay inside inference rate limits.
    pub chunk_pause_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            inference_base_url: env::var("INFERENCE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:11434/v1".to_string()),
            inference_model: env::var("INFERENCE_MODEL")
                .unwrap_or_else(|_| "llama3.2".to_string()),
            inference_api_key: env::var("INFERENCE_API_KEY").ok(),
            geocode_base_url: env::var("GEOCODE_BASE_URL")
                .unwrap_or_else(|_| "https://geocode.xyz".to_string()),
            geocode_interval_secs: parsed_env("GEOCODE_INTERVAL_SECS", 5),
            workers: parsed_env("ANALYZER_WORKERS", 5),
            chunk_size: parsed_env("ANALYZER_CHUNK_SIZE", 100),
            chunk_pause_secs: parsed_env("ANALYZER_CHUNK_PAUSE_SECS", 300),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a number, got {raw:?}")),
        Err(_) => default,
    }
}
