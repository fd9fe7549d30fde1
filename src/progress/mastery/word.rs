use chrono::{DateTime, Utc};

use crate::progress::config::WordMasteryConfig;
use crate::progress::slug::normalize_word;
use crate::progress::types::*;

/// Longer texts are prompts or sentences, not vocabulary items.
pub const MAX_WORD_BYTES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordOutcome {
    /// Introduced or practised without a grade.
    Exposure,
    Correct,
    Incorrect,
}

impl WordOutcome {
    fn from_correctness(correct: Option<bool>) -> Self {
        match correct {
            Some(true) => Self::Correct,
            Some(false) => Self::Incorrect,
            None => Self::Exposure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordOccurrence {
    pub word: String,
    pub translation: Option<String>,
    pub outcome: WordOutcome,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn occurrence(
    text: &str,
    translation: Option<&String>,
    outcome: WordOutcome,
) -> Option<WordOccurrence> {
    let word = normalize_word(text);
    if word.is_empty() {
        return None;
    }
    if word.len() > MAX_WORD_BYTES {
        tracing::debug!(bytes = word.len(), "Skipping step text too long to track as a word");
        return None;
    }
    Some(WordOccurrence {
        word,
        translation: non_empty(translation).map(str::to_string),
        outcome,
    })
}

/// Word occurrences of a lesson in step order. `new_word` steps are always
/// neutral; `practice` steps are graded when the step recorded correctness.
pub fn lesson_occurrences(lesson: &LessonModel) -> Vec<WordOccurrence> {
    lesson
        .steps
        .iter()
        .filter_map(|step| match step.step_type {
            LessonStepType::NewWord => {
                occurrence(&step.content, step.translation.as_ref(), WordOutcome::Exposure)
            }
            LessonStepType::Practice => {
                let text = non_empty(step.expected_answer.as_ref()).unwrap_or(step.content.as_str());
                occurrence(
                    text,
                    step.translation.as_ref(),
                    WordOutcome::from_correctness(step.correct),
                )
            }
            _ => None,
        })
        .collect()
}

pub fn assessment_occurrences(assessment: &AssessmentLesson) -> Vec<WordOccurrence> {
    assessment
        .steps
        .iter()
        .filter(|step| step.step_type == AssessmentStepType::Question)
        .filter_map(|step| {
            let text = non_empty(step.expected_answer.as_ref()).unwrap_or(step.content.as_str());
            occurrence(
                text,
                step.translation.as_ref(),
                WordOutcome::from_correctness(step.correct),
            )
        })
        .collect()
}

/// Seeds the running tally for a word from its stored record, if any.
pub fn start_tally(prior: Option<&WordProgress>, occurrence: &WordOccurrence) -> WordProgressPatch {
    match prior {
        Some(p) => WordProgressPatch {
            word: p.word.clone(),
            translation: p.translation.clone(),
            correct_count: p.correct_count,
            incorrect_count: p.incorrect_count,
            consecutive_correct: p.consecutive_correct,
            exposure_count: p.exposure_count,
            mastery_level: p.mastery_level,
            last_practiced_at: p.last_practiced_at,
        },
        None => WordProgressPatch {
            word: occurrence.word.clone(),
            translation: None,
            correct_count: 0,
            incorrect_count: 0,
            consecutive_correct: 0,
            exposure_count: 0,
            mastery_level: MasteryLevel::Unknown,
            last_practiced_at: None,
        },
    }
}

pub fn record_occurrence(
    tally: &mut WordProgressPatch,
    occurrence: &WordOccurrence,
    at: DateTime<Utc>,
    config: &WordMasteryConfig,
) {
    tally.exposure_count = tally.exposure_count.saturating_add(1);
    if occurrence.translation.is_some() {
        tally.translation = occurrence.translation.clone();
    }

    match occurrence.outcome {
        WordOutcome::Exposure => {
            tally.mastery_level = tally.mastery_level.raise_to(MasteryLevel::Learning);
        }
        WordOutcome::Correct => {
            tally.correct_count = tally.correct_count.saturating_add(1);
            tally.consecutive_correct = tally.consecutive_correct.saturating_add(1);
            tally.last_practiced_at = Some(at);
            tally.mastery_level = tally
                .mastery_level
                .raise_to(level_for_streak(tally.consecutive_correct, config));
        }
        WordOutcome::Incorrect => {
            tally.incorrect_count = tally.incorrect_count.saturating_add(1);
            tally.consecutive_correct = 0;
            tally.last_practiced_at = Some(at);
            tally.mastery_level = MasteryLevel::Learning;
        }
    }
}

fn level_for_streak(streak: u32, config: &WordMasteryConfig) -> MasteryLevel {
    if streak >= config.mastered_streak {
        MasteryLevel::Mastered
    } else if streak >= config.known_streak {
        MasteryLevel::Known
    } else {
        MasteryLevel::Learning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occ(word: &str, outcome: WordOutcome) -> WordOccurrence {
        WordOccurrence {
            word: word.to_string(),
            translation: None,
            outcome,
        }
    }

    #[test]
    fn known_after_streak_and_reset_on_miss() {
        let cfg = WordMasteryConfig::default();
        let now = Utc::now();
        let correct = occ("bahnhof", WordOutcome::Correct);
        let mut tally = start_tally(None, &correct);

        for _ in 0..cfg.known_streak {
            record_occurrence(&mut tally, &correct, now, &cfg);
        }
        assert_eq!(tally.mastery_level, MasteryLevel::Known);
        assert_eq!(tally.consecutive_correct, cfg.known_streak);

        record_occurrence(&mut tally, &occ("bahnhof", WordOutcome::Incorrect), now, &cfg);
        assert_eq!(tally.consecutive_correct, 0);
        assert_eq!(tally.incorrect_count, 1);
        assert_eq!(tally.correct_count, cfg.known_streak);
        assert_eq!(tally.mastery_level, MasteryLevel::Learning);
    }

    #[test]
    fn mastered_at_longer_streak() {
        let cfg = WordMasteryConfig::default();
        let correct = occ("danke", WordOutcome::Correct);
        let mut tally = start_tally(None, &correct);
        for _ in 0..cfg.mastered_streak {
            record_occurrence(&mut tally, &correct, Utc::now(), &cfg);
        }
        assert_eq!(tally.mastery_level, MasteryLevel::Mastered);
    }

    #[test]
    fn exposure_is_neutral() {
        let cfg = WordMasteryConfig::default();
        let seen = occ("bahnhof", WordOutcome::Exposure);
        let mut tally = start_tally(None, &seen);
        tally.consecutive_correct = 2;
        record_occurrence(&mut tally, &seen, Utc::now(), &cfg);

        assert_eq!(tally.exposure_count, 1);
        assert_eq!(tally.correct_count, 0);
        assert_eq!(tally.incorrect_count, 0);
        assert_eq!(tally.consecutive_correct, 2);
        assert_eq!(tally.mastery_level, MasteryLevel::Learning);
        assert!(tally.last_practiced_at.is_none());
    }

    #[test]
    fn lesson_occurrences_follow_step_types() {
        let step = |step_type, content: &str, expected: Option<&str>, correct| LessonStep {
            id: None,
            step_type,
            content: content.to_string(),
            translation: None,
            expected_answer: expected.map(str::to_string),
            user_response: None,
            correct,
        };
        let lesson = LessonModel {
            id: "l1".to_string(),
            focus_area: "travel".to_string(),
            target_skills: vec![],
            steps: vec![
                step(LessonStepType::Instruction, "Welcome", None, None),
                step(LessonStepType::NewWord, "Bahnhof", None, None),
                step(LessonStepType::Practice, "Say: train station", Some("Bahnhof"), Some(true)),
                step(LessonStepType::Practice, "Fahrkarte", None, Some(false)),
                step(LessonStepType::Feedback, "Great job", None, None),
            ],
            performance_metrics: None,
            audio_metrics: None,
            completed_at: None,
        };

        let found = lesson_occurrences(&lesson);
        assert_eq!(
            found,
            vec![
                occ("bahnhof", WordOutcome::Exposure),
                occ("bahnhof", WordOutcome::Correct),
                occ("fahrkarte", WordOutcome::Incorrect),
            ]
        );
    }

    #[test]
    fn long_prompt_text_is_not_tracked() {
        let prompt = "Describe your last train journey in detail. ".repeat(15);
        let lesson = LessonModel {
            id: "l1".to_string(),
            focus_area: "travel".to_string(),
            target_skills: vec![],
            steps: vec![
                LessonStep {
                    id: None,
                    step_type: LessonStepType::Practice,
                    content: prompt,
                    translation: None,
                    expected_answer: None,
                    user_response: None,
                    correct: Some(true),
                },
                LessonStep {
                    id: None,
                    step_type: LessonStepType::NewWord,
                    content: "Gleis".to_string(),
                    translation: Some("platform".to_string()),
                    expected_answer: None,
                    user_response: None,
                    correct: None,
                },
            ],
            performance_metrics: None,
            audio_metrics: None,
            completed_at: None,
        };

        let found = lesson_occurrences(&lesson);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].word, "gleis");
    }

    #[test]
    fn assessment_uses_question_steps_only() {
        let assessment = AssessmentLesson {
            id: "a1".to_string(),
            proposed_topics: vec![],
            steps: vec![
                AssessmentStep {
                    id: None,
                    step_type: AssessmentStepType::Instruction,
                    content: "Let's begin".to_string(),
                    translation: None,
                    expected_answer: None,
                    user_response: None,
                    correct: None,
                },
                AssessmentStep {
                    id: None,
                    step_type: AssessmentStepType::Question,
                    content: "How do you say 'thank you'?".to_string(),
                    translation: Some("thank you".to_string()),
                    expected_answer: Some("Danke".to_string()),
                    user_response: Some("Danke".to_string()),
                    correct: Some(true),
                },
            ],
            metrics: None,
            audio_metrics: None,
            completed_at: None,
        };

        let found = assessment_occurrences(&assessment);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].word, "danke");
        assert_eq!(found[0].translation.as_deref(), Some("thank you"));
        assert_eq!(found[0].outcome, WordOutcome::Correct);
    }
}
