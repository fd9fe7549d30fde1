use async_trait::async_trait;
use thiserror::Error;

use crate::progress::types::*;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("not found: entity={entity}, key={key}")]
    NotFound { entity: String, key: String },
    #[error("constraint violation: {0}")]
    Constraint(String),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Persistence contract consumed by the progress engine.
///
/// Every upsert is a single idempotent call that creates the record when it
/// is absent. Atomicity is per call; the engine never spans a transaction
/// across calls.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    async fn get_learning_progress(
        &self,
        user_id: &str,
    ) -> Result<Option<LearningProgress>, RepositoryError>;

    /// Like `get_learning_progress` with `topics` and `words` populated.
    async fn get_learning_progress_with_details(
        &self,
        user_id: &str,
    ) -> Result<Option<LearningProgress>, RepositoryError>;

    async fn upsert_learning_progress(
        &self,
        user_id: &str,
        patch: &LearningProgressPatch,
    ) -> Result<LearningProgress, RepositoryError>;

    async fn upsert_topic_progress(
        &self,
        learning_progress_id: &str,
        patch: &TopicProgressPatch,
    ) -> Result<TopicProgress, RepositoryError>;

    async fn upsert_word_progress(
        &self,
        learning_progress_id: &str,
        patch: &WordProgressPatch,
    ) -> Result<WordProgress, RepositoryError>;
}
