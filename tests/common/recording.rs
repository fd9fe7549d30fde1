//! In-memory repository that records every call and can fail a chosen one.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use learning_progress::progress::types::*;
use learning_progress::progress::{ProgressRepository, RepositoryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    GetProgress,
    GetDetails,
    UpsertProgress,
    UpsertTopic,
    UpsertWord,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RepoCall {
    GetProgress(String),
    GetDetails(String),
    UpsertProgress(String, LearningProgressPatch),
    UpsertTopic(String, TopicProgressPatch),
    UpsertWord(String, WordProgressPatch),
}

impl RepoCall {
    pub fn kind(&self) -> CallKind {
        match self {
            RepoCall::GetProgress(_) => CallKind::GetProgress,
            RepoCall::GetDetails(_) => CallKind::GetDetails,
            RepoCall::UpsertProgress(..) => CallKind::UpsertProgress,
            RepoCall::UpsertTopic(..) => CallKind::UpsertTopic,
            RepoCall::UpsertWord(..) => CallKind::UpsertWord,
        }
    }
}

#[derive(Default)]
struct Inner {
    calls: Vec<RepoCall>,
    progress: HashMap<String, LearningProgress>,
    topics: Vec<TopicProgress>,
    words: Vec<WordProgress>,
    fail_on: Option<CallKind>,
}

#[derive(Default)]
pub struct RecordingRepository {
    inner: Mutex<Inner>,
}

impl RecordingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(kind: CallKind) -> Self {
        let repo = Self::default();
        repo.inner.lock().unwrap().fail_on = Some(kind);
        repo
    }

    /// Stores a record directly, bypassing the call log.
    pub fn seed(&self, progress: LearningProgress) {
        let mut inner = self.inner.lock().unwrap();
        inner.progress.insert(progress.user_id.clone(), progress);
    }

    pub fn calls(&self) -> Vec<RepoCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn kinds(&self) -> Vec<CallKind> {
        self.calls().iter().map(RepoCall::kind).collect()
    }

    pub fn count(&self, kind: CallKind) -> usize {
        self.kinds().into_iter().filter(|k| *k == kind).count()
    }

    pub fn stored(&self, user_id: &str) -> Option<LearningProgress> {
        self.inner.lock().unwrap().progress.get(user_id).cloned()
    }

    pub fn stored_word(&self, word: &str) -> Option<WordProgress> {
        let inner = self.inner.lock().unwrap();
        inner.words.iter().find(|w| w.word == word).cloned()
    }

    pub fn stored_topic(&self, topic_name: &str) -> Option<TopicProgress> {
        let inner = self.inner.lock().unwrap();
        inner.topics.iter().find(|t| t.topic_name == topic_name).cloned()
    }

    fn record(&self, call: RepoCall) -> Result<std::sync::MutexGuard<'_, Inner>, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let kind = call.kind();
        inner.calls.push(call);
        if inner.fail_on == Some(kind) {
            return Err(RepositoryError::Unavailable(format!("{kind:?} failed")));
        }
        Ok(inner)
    }
}

#[async_trait]
impl ProgressRepository for RecordingRepository {
    async fn get_learning_progress(
        &self,
        user_id: &str,
    ) -> Result<Option<LearningProgress>, RepositoryError> {
        let inner = self.record(RepoCall::GetProgress(user_id.to_string()))?;
        Ok(inner.progress.get(user_id).cloned())
    }

    async fn get_learning_progress_with_details(
        &self,
        user_id: &str,
    ) -> Result<Option<LearningProgress>, RepositoryError> {
        let inner = self.record(RepoCall::GetDetails(user_id.to_string()))?;
        Ok(inner.progress.get(user_id).cloned().map(|mut progress| {
            progress.topics = inner
                .topics
                .iter()
                .filter(|t| t.learning_progress_id == progress.id)
                .cloned()
                .collect();
            progress.words = inner
                .words
                .iter()
                .filter(|w| w.learning_progress_id == progress.id)
                .cloned()
                .collect();
            progress
        }))
    }

    async fn upsert_learning_progress(
        &self,
        user_id: &str,
        patch: &LearningProgressPatch,
    ) -> Result<LearningProgress, RepositoryError> {
        let mut inner =
            self.record(RepoCall::UpsertProgress(user_id.to_string(), patch.clone()))?;
        let progress = inner
            .progress
            .entry(user_id.to_string())
            .or_insert_with(|| LearningProgress::new(user_id));
        progress.apply_patch(patch);
        Ok(progress.clone())
    }

    async fn upsert_topic_progress(
        &self,
        learning_progress_id: &str,
        patch: &TopicProgressPatch,
    ) -> Result<TopicProgress, RepositoryError> {
        let mut inner = self.record(RepoCall::UpsertTopic(
            learning_progress_id.to_string(),
            patch.clone(),
        ))?;
        let now = chrono::Utc::now();
        let position = inner.topics.iter().position(|t| {
            t.learning_progress_id == learning_progress_id && t.topic_name == patch.topic_name
        });
        let index = match position {
            Some(index) => index,
            None => {
                inner.topics.push(TopicProgress {
                    learning_progress_id: learning_progress_id.to_string(),
                    topic_name: patch.topic_name.clone(),
                    mastery_level: MasteryLevel::Unknown,
                    related_lesson_ids: vec![],
                    related_assessment_ids: vec![],
                    updated_at: now,
                });
                inner.topics.len() - 1
            }
        };
        let topic = &mut inner.topics[index];
        topic.mastery_level = patch.mastery_level;
        for id in &patch.related_lesson_ids {
            if !topic.related_lesson_ids.contains(id) {
                topic.related_lesson_ids.push(id.clone());
            }
        }
        for id in &patch.related_assessment_ids {
            if !topic.related_assessment_ids.contains(id) {
                topic.related_assessment_ids.push(id.clone());
            }
        }
        topic.updated_at = now;
        Ok(topic.clone())
    }

    async fn upsert_word_progress(
        &self,
        learning_progress_id: &str,
        patch: &WordProgressPatch,
    ) -> Result<WordProgress, RepositoryError> {
        let mut inner = self.record(RepoCall::UpsertWord(
            learning_progress_id.to_string(),
            patch.clone(),
        ))?;
        let word = WordProgress {
            learning_progress_id: learning_progress_id.to_string(),
            word: patch.word.clone(),
            translation: patch.translation.clone(),
            correct_count: patch.correct_count,
            incorrect_count: patch.incorrect_count,
            consecutive_correct: patch.consecutive_correct,
            exposure_count: patch.exposure_count,
            mastery_level: patch.mastery_level,
            last_practiced_at: patch.last_practiced_at,
            updated_at: chrono::Utc::now(),
        };
        inner
            .words
            .retain(|w| !(w.learning_progress_id == learning_progress_id && w.word == patch.word));
        inner.words.push(word.clone());
        Ok(word)
    }
}
