use chrono::Utc;
use sled::transaction::{ConflictableTransactionError, ConflictableTransactionResult};
use sled::Transactional;

use crate::progress::types::*;
use crate::store::keys;
use crate::store::{map_tx_error, Store, StoreError};

fn abort(e: StoreError) -> ConflictableTransactionError<StoreError> {
    ConflictableTransactionError::Abort(e)
}

fn append_unique(target: &mut Vec<String>, incoming: &[String]) {
    for id in incoming {
        if !target.contains(id) {
            target.push(id.clone());
        }
    }
}

impl Store {
    pub fn get_learning_progress(
        &self,
        user_id: &str,
    ) -> Result<Option<LearningProgress>, StoreError> {
        let key = keys::learning_progress_key(user_id)?;
        match self.learning_progress.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn get_learning_progress_with_details(
        &self,
        user_id: &str,
    ) -> Result<Option<LearningProgress>, StoreError> {
        let Some(mut progress) = self.get_learning_progress(user_id)? else {
            return Ok(None);
        };
        progress.topics = self.list_topic_progress(&progress.id)?;
        progress.words = self.list_word_progress(&progress.id)?;
        Ok(Some(progress))
    }

    pub fn get_learning_progress_by_id(
        &self,
        progress_id: &str,
    ) -> Result<Option<LearningProgress>, StoreError> {
        let key = keys::progress_id_key(progress_id)?;
        let Some(user_raw) = self.progress_by_id.get(key.as_bytes())? else {
            return Ok(None);
        };
        let user_id = String::from_utf8(user_raw.to_vec())
            .map_err(|e| StoreError::Validation(format!("invalid user id in progress index: {e}")))?;
        self.get_learning_progress(&user_id)
    }

    /// Creates the user's record on first call; later calls merge the patch
    /// into the stored record. The id index is written in the same transaction.
    pub fn upsert_learning_progress(
        &self,
        user_id: &str,
        patch: &LearningProgressPatch,
    ) -> Result<LearningProgress, StoreError> {
        let key = keys::learning_progress_key(user_id)?;

        (&self.learning_progress, &self.progress_by_id)
            .transaction(|(progress_tx, index_tx)| -> ConflictableTransactionResult<_, StoreError> {
                let mut progress = match progress_tx.get(key.as_bytes())? {
                    Some(raw) => Self::deserialize::<LearningProgress>(&raw).map_err(abort)?,
                    None => LearningProgress::new(user_id),
                };
                progress.apply_patch(patch);
                // Child records live in their own trees.
                progress.topics.clear();
                progress.words.clear();

                let index_key = keys::progress_id_key(&progress.id).map_err(abort)?;
                progress_tx.insert(key.as_bytes(), Self::serialize(&progress).map_err(abort)?)?;
                index_tx.insert(index_key.as_bytes(), user_id.as_bytes())?;
                Ok(progress)
            })
            .map_err(map_tx_error)
    }

    pub fn upsert_topic_progress(
        &self,
        progress_id: &str,
        patch: &TopicProgressPatch,
    ) -> Result<TopicProgress, StoreError> {
        self.require_progress(progress_id)?;
        let key = keys::topic_progress_key(progress_id, &patch.topic_name)?;
        let now = Utc::now();

        self.topic_progress
            .transaction(|tx| -> ConflictableTransactionResult<_, StoreError> {
                let mut topic = match tx.get(key.as_bytes())? {
                    Some(raw) => Self::deserialize::<TopicProgress>(&raw).map_err(abort)?,
                    None => TopicProgress {
                        learning_progress_id: progress_id.to_string(),
                        topic_name: patch.topic_name.clone(),
                        mastery_level: MasteryLevel::Unknown,
                        related_lesson_ids: Vec::new(),
                        related_assessment_ids: Vec::new(),
                        updated_at: now,
                    },
                };
                topic.mastery_level = patch.mastery_level;
                append_unique(&mut topic.related_lesson_ids, &patch.related_lesson_ids);
                append_unique(&mut topic.related_assessment_ids, &patch.related_assessment_ids);
                topic.updated_at = now;

                tx.insert(key.as_bytes(), Self::serialize(&topic).map_err(abort)?)?;
                Ok(topic)
            })
            .map_err(map_tx_error)
    }

    /// Counters in the patch replace the stored ones; the caller owns the tally.
    pub fn upsert_word_progress(
        &self,
        progress_id: &str,
        patch: &WordProgressPatch,
    ) -> Result<WordProgress, StoreError> {
        self.require_progress(progress_id)?;
        let key = keys::word_progress_key(progress_id, &patch.word)?;

        let word = WordProgress {
            learning_progress_id: progress_id.to_string(),
            word: patch.word.clone(),
            translation: patch.translation.clone(),
            correct_count: patch.correct_count,
            incorrect_count: patch.incorrect_count,
            consecutive_correct: patch.consecutive_correct,
            exposure_count: patch.exposure_count,
            mastery_level: patch.mastery_level,
            last_practiced_at: patch.last_practiced_at,
            updated_at: Utc::now(),
        };
        self.word_progress
            .insert(key.as_bytes(), Self::serialize(&word)?)?;
        Ok(word)
    }

    pub fn list_topic_progress(&self, progress_id: &str) -> Result<Vec<TopicProgress>, StoreError> {
        let prefix = keys::progress_child_prefix(progress_id)?;
        let mut topics = Vec::new();
        for item in self.topic_progress.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            topics.push(Self::deserialize(&value)?);
        }
        Ok(topics)
    }

    pub fn list_word_progress(&self, progress_id: &str) -> Result<Vec<WordProgress>, StoreError> {
        let prefix = keys::progress_child_prefix(progress_id)?;
        let mut words = Vec::new();
        for item in self.word_progress.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            words.push(Self::deserialize(&value)?);
        }
        Ok(words)
    }

    fn require_progress(&self, progress_id: &str) -> Result<(), StoreError> {
        let key = keys::progress_id_key(progress_id)?;
        if self.progress_by_id.contains_key(key.as_bytes())? {
            Ok(())
        } else {
            Err(StoreError::NotFound {
                entity: "learning_progress".to_string(),
                key: progress_id.to_string(),
            })
        }
    }
}
