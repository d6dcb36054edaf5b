pub mod orchestrator;
pub mod pipeline;
pub mod resolver;

pub use orchestrator::{BatchOrchestrator, BatchStats, GeocodeStats};
pub use pipeline::TweetAnalyzer;
pub use resolver::GeocodeResolver;
