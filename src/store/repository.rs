use async_trait::async_trait;

use crate::progress::repository::{ProgressRepository, RepositoryError};
use crate::progress::types::*;
use crate::store::{Store, StoreError};

impl From<StoreError> for RepositoryError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { entity, key } => RepositoryError::NotFound { entity, key },
            StoreError::Validation(msg) => RepositoryError::Constraint(msg),
            StoreError::Serialization(e) => RepositoryError::Corrupt(e.to_string()),
            other => RepositoryError::Unavailable(other.to_string()),
        }
    }
}

/// Sled calls are short and local, so they run inline on the async task.
#[async_trait]
impl ProgressRepository for Store {
    async fn get_learning_progress(
        &self,
        user_id: &str,
    ) -> Result<Option<LearningProgress>, RepositoryError> {
        Ok(Store::get_learning_progress(self, user_id)?)
    }

    async fn get_learning_progress_with_details(
        &self,
        user_id: &str,
    ) -> Result<Option<LearningProgress>, RepositoryError> {
        Ok(Store::get_learning_progress_with_details(self, user_id)?)
    }

    async fn upsert_learning_progress(
        &self,
        user_id: &str,
        patch: &LearningProgressPatch,
    ) -> Result<LearningProgress, RepositoryError> {
        Ok(Store::upsert_learning_progress(self, user_id, patch)?)
    }

    async fn upsert_topic_progress(
        &self,
        learning_progress_id: &str,
        patch: &TopicProgressPatch,
    ) -> Result<TopicProgress, RepositoryError> {
        Ok(Store::upsert_topic_progress(self, learning_progress_id, patch)?)
    }

    async fn upsert_word_progress(
        &self,
        learning_progress_id: &str,
        patch: &WordProgressPatch,
    ) -> Result<WordProgress, RepositoryError> {
        Ok(Store::upsert_word_progress(self, learning_progress_id, patch)?)
    }
}
