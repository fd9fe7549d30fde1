//! Learning progress engine: normalizes completion events, tracks topic and
//! word mastery, folds signals into the per-user aggregate and ranks topics
//! for upcoming lessons.

pub mod aggregator;
pub mod config;
pub mod mastery;
pub mod normalizer;
pub mod repository;
pub mod slug;
pub mod topic_selector;
pub mod types;

pub use aggregator::{ProgressEngine, ProgressError};
pub use config::ProgressConfig;
pub use repository::{ProgressRepository, RepositoryError};
