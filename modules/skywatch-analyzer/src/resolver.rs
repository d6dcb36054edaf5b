use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info, warn};

use geocode_client::{Coordinates, Geocoder};
use skywatch_common::is_unspecified;

/// Separators the models produce for compound locations
/// ("Valencia, Spain", "Aragon and Catalonia").
fn part_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r", | and ").expect("static separator regex"))
}

/// Ordered candidate queries for a free-text location: the verbatim string,
/// its last whitespace token, then each separated part in order. Duplicates
/// are dropped so each query is attempted at most once.
pub fn candidate_queries(location: &str) -> Vec<String> {
    let full = location.trim();
    let mut queries = Vec::new();

    push_unique(&mut queries, full);
    if let Some(last) = full.split_whitespace().last() {
        push_unique(&mut queries, last);
    }
    for part in part_separator().split(full) {
        push_unique(&mut queries, part);
    }

    queries
}

fn push_unique(queries: &mut Vec<String>, candidate: &str) {
    let candidate = candidate.trim();
    if !candidate.is_empty() && !queries.iter().any(|q| q == candidate) {
        queries.push(candidate.to_string());
    }
}

/// Multi-strategy geocoding: try each candidate query in order and stop at
/// the first usable coordinate pair.
pub struct GeocodeResolver<G: Geocoder> {
    geocoder: G,
}

impl<G: Geocoder> GeocodeResolver<G> {
    pub fn new(geocoder: G) -> Self {
        Self { geocoder }
    }

    /// Resolve a location string to coordinates, or `None` when the input is
    /// a sentinel or every strategy came up empty. Lookup faults fall
    /// through to the next candidate; they never abort the record.
    pub async fn resolve(&self, location: &str) -> Option<Coordinates> {
        if is_unspecified(location) {
            return None;
        }

        for query in candidate_queries(location) {
            match self.geocoder.lookup(&query).await {
                Ok(Some(coordinates)) => {
                    info!(
                        location,
                        query = query.as_str(),
                        latitude = coordinates.latitude,
                        longitude = coordinates.longitude,
                        "Location resolved"
                    );
                    return Some(coordinates);
                }
                Ok(None) => debug!(query = query.as_str(), "No geocode match"),
                Err(e) => warn!(query = query.as_str(), error = %e, "Geocode lookup failed"),
            }
        }

        info!(location, "All geocode strategies exhausted");
        None
    }
}
