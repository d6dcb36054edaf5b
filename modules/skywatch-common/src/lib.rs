pub mod config;
pub mod retry;
pub mod types;

pub use config::Config;
pub use retry::RetryPolicy;
pub use types::{
    is_unspecified, ExtractionRecord, SocialPost, NONE_SENTINEL, NOT_SPECIFIED,
};
