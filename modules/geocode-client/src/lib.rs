pub mod error;
pub mod types;

pub use error::{GeocodeError, Result};
pub use types::Coordinates;

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use skywatch_common::RetryPolicy;
use types::PlaceResponse;

const DEFAULT_BASE_URL: &str = "https://geocode.xyz";

/// Minimum spacing between outbound requests. The upstream free tier is
/// strictly rate limited, so this is an invariant of the client, not a knob
/// callers may skip.
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(5);

/// The geocoding service boundary. `Ok(None)` is the service's explicit
/// "no match" answer, distinct from a call fault.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup(&self, place: &str) -> Result<Option<Coordinates>>;
}

pub struct GeocodeClient {
    http: reqwest::Client,
    base_url: String,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
    retry: RetryPolicy,
}

impl GeocodeClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            min_interval: DEFAULT_MIN_INTERVAL,
            last_request: Mutex::new(None),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sleep until at least `min_interval` has passed since the previous
    /// request started, then claim the current slot.
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let next_allowed = prev + self.min_interval;
            let now = Instant::now();
            if next_allowed > now {
                tokio::time::sleep(next_allowed - now).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn fetch(&self, place: &str) -> Result<PlaceResponse> {
        self.throttle().await;

        let url = format!("{}/{}", self.base_url, place);
        debug!(place, "Geocode request");

        let response = self.http.get(&url).query(&[("json", "1")]).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| GeocodeError::Parse(e.to_string()))
    }
}

impl Default for GeocodeClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geocoder for GeocodeClient {
    async fn lookup(&self, place: &str) -> Result<Option<Coordinates>> {
        let response = self
            .retry
            .run("geocode", || self.fetch(place))
            .await?;
        Ok(response.into_match())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let client = GeocodeClient::new();
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
        assert_eq!(client.min_interval, DEFAULT_MIN_INTERVAL);
    }

    #[test]
    fn builder_overrides() {
        let client = GeocodeClient::new()
            .with_base_url("http://localhost:9999")
            .with_min_interval(Duration::ZERO);
        assert_eq!(client.base_url, "http://localhost:9999");
        assert_eq!(client.min_interval, Duration::ZERO);
    }
}
