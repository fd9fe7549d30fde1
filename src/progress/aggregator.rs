use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

use crate::progress::config::{ProgressConfig, ScoringConfig};
use crate::progress::mastery::{topic, word};
use crate::progress::normalizer::{self, merge_labels};
use crate::progress::repository::{ProgressRepository, RepositoryError};
use crate::progress::slug::normalize_topic_name;
use crate::progress::topic_selector;
use crate::progress::types::*;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Everything one completion event contributes, already normalized.
struct CompletionEvent {
    signal: PerformanceSignal,
    topics: Vec<String>,
    focus_area: Option<String>,
    words: Vec<word::WordOccurrence>,
    kind: &'static str,
}

/// Entry point of the progress engine.
///
/// Updates are best-effort: they never return an error to the caller, so the
/// lesson/assessment completion that triggered them succeeds regardless.
pub struct ProgressEngine {
    config: Arc<RwLock<ProgressConfig>>,
    repository: Arc<dyn ProgressRepository>,
}

impl ProgressEngine {
    pub fn new(config: ProgressConfig, repository: Arc<dyn ProgressRepository>) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            repository,
        }
    }

    pub async fn reload_config(&self, new_config: ProgressConfig) -> Result<(), String> {
        new_config.validate()?;
        let mut cfg = self.config.write().await;
        *cfg = new_config;
        tracing::info!("Progress engine config reloaded");
        Ok(())
    }

    pub async fn get_config(&self) -> ProgressConfig {
        self.config.read().await.clone()
    }

    pub async fn update_after_lesson(&self, user_id: &str, lesson: &LessonModel) {
        let event = CompletionEvent {
            signal: normalizer::from_lesson(lesson),
            topics: topic::lesson_topics(lesson),
            focus_area: Some(normalize_topic_name(&lesson.focus_area)),
            words: word::lesson_occurrences(lesson),
            kind: "lesson",
        };

        if let Err(e) = self.apply_event(user_id, &event).await {
            tracing::error!(
                user_id,
                source_id = %lesson.id,
                error = %e,
                "Failed to update learning progress after lesson"
            );
        }
    }

    pub async fn update_after_assessment(&self, user_id: &str, assessment: &AssessmentLesson) {
        let event = CompletionEvent {
            signal: normalizer::from_assessment(assessment),
            topics: topic::assessment_topics(assessment),
            focus_area: None,
            words: word::assessment_occurrences(assessment),
            kind: "assessment",
        };

        if let Err(e) = self.apply_event(user_id, &event).await {
            tracing::error!(
                user_id,
                source_id = %assessment.id,
                error = %e,
                "Failed to update learning progress after assessment"
            );
        }
    }

    pub async fn get_progress(&self, user_id: &str) -> Option<LearningProgress> {
        match self.repository.get_learning_progress(user_id).await {
            Ok(progress) => progress,
            Err(e) => {
                tracing::error!(user_id, error = %e, "Failed to load learning progress");
                None
            }
        }
    }

    pub async fn get_progress_with_details(&self, user_id: &str) -> Option<LearningProgress> {
        match self.repository.get_learning_progress_with_details(user_id).await {
            Ok(progress) => progress,
            Err(e) => {
                tracing::error!(user_id, error = %e, "Failed to load learning progress details");
                None
            }
        }
    }

    /// Ranks topics for the user's next lessons. When the context carries no
    /// progress the latest stored state is loaded.
    pub async fn select_topics(&self, user_id: &str, mut context: SelectionContext) -> Vec<String> {
        if context.progress.is_none() {
            context.progress = self.get_progress_with_details(user_id).await;
        }
        let config = self.config.read().await.clone();
        let topics = topic_selector::select_topics(&context, &config.topic_selection);
        tracing::debug!(user_id, topics = ?topics, "Selected lesson topics");
        topics
    }

    async fn apply_event(
        &self,
        user_id: &str,
        event: &CompletionEvent,
    ) -> Result<(), ProgressError> {
        let config = self.config.read().await.clone();
        let signal = &event.signal;

        let prior = match self
            .repository
            .get_learning_progress_with_details(user_id)
            .await?
        {
            Some(progress) => progress,
            None => {
                let created = self
                    .repository
                    .upsert_learning_progress(user_id, &LearningProgressPatch::initial())
                    .await?;
                tracing::info!(user_id, progress_id = %created.id, "Created learning progress");
                created
            }
        };

        if signal.effective_overall().is_none() {
            tracing::warn!(
                user_id,
                source_id = %signal.source_id,
                kind = event.kind,
                "Completion carries no overall score, skipping score update"
            );
        }

        for topic_name in &event.topics {
            let patch = topic::update_topic(
                prior.topic(topic_name),
                topic_name,
                signal,
                event.focus_area.as_deref(),
                &config.topic_mastery,
            );
            self.repository
                .upsert_topic_progress(&prior.id, &patch)
                .await?;
        }

        // Repeats within one event accumulate in step order, one upsert per occurrence.
        let mut tallies: HashMap<String, WordProgressPatch> = HashMap::new();
        for occurrence in &event.words {
            let tally = tallies
                .entry(occurrence.word.clone())
                .or_insert_with(|| word::start_tally(prior.word(&occurrence.word), occurrence));
            word::record_occurrence(tally, occurrence, signal.occurred_at, &config.word_mastery);
            self.repository
                .upsert_word_progress(&prior.id, tally)
                .await?;
        }

        let patch = fold_signal(&prior, signal, &config.scoring);
        let updated = self
            .repository
            .upsert_learning_progress(user_id, &patch)
            .await?;

        tracing::info!(
            user_id,
            source_id = %signal.source_id,
            kind = event.kind,
            overall_score = updated.overall_score,
            level = updated.estimated_proficiency_level.as_str(),
            topics = event.topics.len(),
            words = event.words.len(),
            "Learning progress updated"
        );

        Ok(())
    }
}

/// Folds one signal into the prior aggregate, producing the patch to persist.
pub fn fold_signal(
    prior: &LearningProgress,
    signal: &PerformanceSignal,
    config: &ScoringConfig,
) -> LearningProgressPatch {
    let mut patch = LearningProgressPatch::default();

    let new_score = signal.effective_overall().map(|incoming| {
        clamp_score(prior.overall_score * config.prior_weight + incoming * config.signal_weight)
    });
    patch.overall_score = new_score;

    patch.learning_trajectory = match (signal.audio_trajectory, new_score) {
        (Some(trajectory), _) => Some(trajectory),
        (None, Some(score)) => Some(classify_trajectory(score - prior.overall_score, config)),
        (None, None) => None,
    };

    // An audio-assessed level stands in for the score band.
    let candidate = signal
        .audio_proficiency_level
        .or_else(|| new_score.map(|score| proficiency_for_score(score, config)));
    if let Some(candidate) = candidate {
        patch.estimated_proficiency_level =
            Some(prior.estimated_proficiency_level.raise_to(candidate));
    }

    let mut strengths = prior.strengths.clone();
    merge_labels(&mut strengths, &signal.strengths, config.max_labels);
    patch.strengths = Some(strengths);

    let mut weaknesses = prior.weaknesses.clone();
    merge_labels(&mut weaknesses, &signal.weaknesses, config.max_labels);
    patch.weaknesses = Some(weaknesses);

    match signal.source {
        SignalSource::Lesson => patch.last_lesson_completed_at = Some(signal.occurred_at),
        SignalSource::Assessment => patch.last_assessment_completed_at = Some(signal.occurred_at),
    }

    patch
}

pub fn proficiency_for_score(score: f64, config: &ScoringConfig) -> ProficiencyLevel {
    if score >= config.advanced_min_score {
        ProficiencyLevel::Advanced
    } else if score >= config.intermediate_min_score {
        ProficiencyLevel::Intermediate
    } else {
        ProficiencyLevel::Beginner
    }
}

pub fn classify_trajectory(delta: f64, config: &ScoringConfig) -> LearningTrajectory {
    if delta >= config.accelerating_delta && delta > 0.0 {
        LearningTrajectory::Accelerating
    } else if delta <= -config.declining_delta && delta < 0.0 {
        LearningTrajectory::Declining
    } else {
        LearningTrajectory::Steady
    }
}
