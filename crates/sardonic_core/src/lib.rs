pub mod catalog;
pub mod classifier;
pub mod config;
pub mod error;
pub mod random;
pub mod types;

pub use catalog::ContentCatalog;
pub use classifier::classify;
pub use config::SardonicConfig;
pub use error::EngineError;
pub use random::RandomSource;
pub use types::{Candidate, ContentItem, Intent, Mood, Source, Turn};
