use chrono::{TimeZone, Utc};

use learning_progress::progress::types::*;

pub fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn text_metrics(overall: Option<f64>, strengths: &[&str], weaknesses: &[&str]) -> TextMetrics {
    TextMetrics {
        accuracy: overall,
        overall_score: overall,
        strengths: labels(strengths),
        weaknesses: labels(weaknesses),
        ..TextMetrics::default()
    }
}

pub fn audio_metrics(overall: f64, level: Option<&str>) -> AudioMetrics {
    AudioMetrics {
        overall_performance: Some(overall),
        proficiency_level: level.map(str::to_string),
        ..AudioMetrics::default()
    }
}

pub fn lesson_step(step_type: LessonStepType, content: &str, correct: Option<bool>) -> LessonStep {
    LessonStep {
        id: None,
        step_type,
        content: content.to_string(),
        translation: None,
        expected_answer: None,
        user_response: None,
        correct,
    }
}

pub fn lesson(id: &str, focus_area: &str, metrics: Option<TextMetrics>) -> LessonModel {
    LessonModel {
        id: id.to_string(),
        focus_area: focus_area.to_string(),
        target_skills: vec![],
        steps: vec![],
        performance_metrics: metrics,
        audio_metrics: None,
        completed_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()),
    }
}

/// Instruction, then "Bahnhof" introduced, practised correctly, and a
/// missed "Fahrkarte".
pub fn bahnhof_lesson() -> LessonModel {
    LessonModel {
        target_skills: labels(&["Asking Directions"]),
        steps: vec![
            lesson_step(LessonStepType::Instruction, "Today we travel by train.", None),
            LessonStep {
                translation: Some("train station".to_string()),
                ..lesson_step(LessonStepType::NewWord, "Bahnhof", None)
            },
            LessonStep {
                expected_answer: Some("Bahnhof".to_string()),
                user_response: Some("Bahnhof".to_string()),
                ..lesson_step(LessonStepType::Practice, "Say 'train station'", Some(true))
            },
            LessonStep {
                expected_answer: Some("Fahrkarte".to_string()),
                user_response: Some("Fahrkate".to_string()),
                ..lesson_step(LessonStepType::Practice, "Say 'ticket'", Some(false))
            },
        ],
        ..lesson(
            "lesson-bahnhof",
            "Travel Vocabulary",
            Some(text_metrics(Some(78.0), &["Vocabulary"], &["Word order"])),
        )
    }
}

pub fn assessment(
    id: &str,
    topics: &[&str],
    metrics: Option<TextMetrics>,
    audio: Option<AudioMetrics>,
) -> AssessmentLesson {
    AssessmentLesson {
        id: id.to_string(),
        proposed_topics: labels(topics),
        steps: vec![],
        metrics,
        audio_metrics: audio,
        completed_at: None,
    }
}

pub fn question(expected: &str, correct: bool) -> AssessmentStep {
    AssessmentStep {
        id: None,
        step_type: AssessmentStepType::Question,
        content: format!("Translate: {expected}"),
        translation: None,
        expected_answer: Some(expected.to_string()),
        user_response: None,
        correct: Some(correct),
    }
}

pub fn travel_preferences(level: Option<&str>) -> OnboardingPreferences {
    OnboardingPreferences {
        native_language: Some("English".to_string()),
        target_language: Some("German".to_string()),
        learning_purpose: Some("travel".to_string()),
        proficiency_level: level.map(str::to_string),
    }
}
