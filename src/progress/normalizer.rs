//! Maps completed lessons and assessments onto one `PerformanceSignal`.

use chrono::{DateTime, Utc};

use crate::progress::types::*;

pub fn from_lesson(lesson: &LessonModel) -> PerformanceSignal {
    build_signal(
        SignalSource::Lesson,
        &lesson.id,
        lesson.completed_at,
        lesson.performance_metrics.as_ref(),
        lesson.audio_metrics.as_ref(),
    )
}

pub fn from_assessment(assessment: &AssessmentLesson) -> PerformanceSignal {
    build_signal(
        SignalSource::Assessment,
        &assessment.id,
        assessment.completed_at,
        assessment.metrics.as_ref(),
        assessment.audio_metrics.as_ref(),
    )
}

/// Strengths and weaknesses come from the metrics only; graded steps feed
/// word mastery, not labels.
fn build_signal(
    source: SignalSource,
    source_id: &str,
    completed_at: Option<DateTime<Utc>>,
    text: Option<&TextMetrics>,
    audio: Option<&AudioMetrics>,
) -> PerformanceSignal {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    if let Some(text) = text {
        merge_labels(&mut strengths, &text.strengths, usize::MAX);
        merge_labels(&mut weaknesses, &text.weaknesses, usize::MAX);
    }
    if let Some(audio) = audio {
        for section in audio.sections() {
            merge_labels(&mut strengths, &section.strengths, usize::MAX);
            merge_labels(&mut weaknesses, &section.areas_for_development, usize::MAX);
        }
    }

    let text_score = |pick: fn(&TextMetrics) -> Option<f64>| text.and_then(pick).map(clamp_score);
    let audio_score = |pick: fn(&AudioMetrics) -> Option<f64>| audio.and_then(pick).map(clamp_score);

    PerformanceSignal {
        source,
        source_id: source_id.to_string(),
        occurred_at: completed_at.unwrap_or_else(Utc::now),
        accuracy: text_score(|t| t.accuracy),
        pronunciation_score: text_score(|t| t.pronunciation_score)
            .or(audio_score(|a| a.pronunciation_score)),
        grammar_score: text_score(|t| t.grammar_score).or(audio_score(|a| a.grammar_score)),
        vocabulary_score: text_score(|t| t.vocabulary_score)
            .or(audio_score(|a| a.vocabulary_score)),
        overall_score: text_score(|t| t.overall_score),
        strengths,
        weaknesses,
        audio_overall_performance: audio_score(|a| a.overall_performance),
        audio_proficiency_level: audio
            .and_then(|a| a.proficiency_level.as_deref())
            .and_then(ProficiencyLevel::from_label),
        audio_trajectory: audio
            .and_then(|a| a.learning_trajectory.as_deref())
            .and_then(LearningTrajectory::from_label),
    }
}

/// Appends trimmed, non-empty labels not already present, stopping at `cap`.
/// Returns how many labels were added.
pub fn merge_labels(target: &mut Vec<String>, incoming: &[String], cap: usize) -> usize {
    let mut added = 0;
    for label in incoming {
        if target.len() >= cap {
            break;
        }
        let label = label.trim();
        if label.is_empty() || target.iter().any(|existing| existing == label) {
            continue;
        }
        target.push(label.to_string());
        added += 1;
    }
    added
}
