use serde::{Deserialize, Serialize};

/// Value written for downstream fields when stage 1 rules a post out.
pub const NONE_SENTINEL: &str = "None";

/// Value the model reports when the post text does not name an attribute.
pub const NOT_SPECIFIED: &str = "Not Specified";

/// True when a field carries no usable value: either sentinel, any casing,
/// or an empty string.
pub fn is_unspecified(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v.eq_ignore_ascii_case(NONE_SENTINEL) || v.eq_ignore_ascii_case(NOT_SPECIFIED)
}

/// A raw post from the ingestion side, immutable input to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialPost {
    pub id: String,
    pub timestamp: String,
    pub text: String,
    pub hashtags: String,
}

impl SocialPost {
    /// Text the classifier sees: body plus hashtags, which often carry the
    /// only disaster mention.
    pub fn full_text(&self) -> String {
        if self.hashtags.trim().is_empty() {
            self.text.clone()
        } else {
            format!("{} {}", self.text, self.hashtags)
        }
    }
}

/// The merged, persisted result for one post. Keyed uniquely by `tweet_id`;
/// coordinates are filled in by a later geocoding pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub tweet_id: String,
    pub timestamp: String,
    pub text: String,
    pub is_genuine_disaster: bool,
    pub disaster_type: String,
    pub location: String,
    pub severity_score: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ExtractionRecord {
    /// Record for a post stage 1 classified as not a genuine disaster.
    /// Everything downstream is the "None" sentinel.
    pub fn non_disaster(post: &SocialPost) -> Self {
        Self {
            tweet_id: post.id.clone(),
            timestamp: post.timestamp.clone(),
            text: post.full_text(),
            is_genuine_disaster: false,
            disaster_type: NONE_SENTINEL.to_string(),
            location: NONE_SENTINEL.to_string(),
            severity_score: None,
            latitude: None,
            longitude: None,
        }
    }

    /// Whether the geocoding pass should attempt this record at all.
    pub fn wants_geocoding(&self) -> bool {
        self.is_genuine_disaster && !is_unspecified(&self.location) && self.latitude.is_none()
    }
}
