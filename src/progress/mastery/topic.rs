use crate::progress::config::TopicMasteryConfig;
use crate::progress::slug::{normalize_topic_name, topic_slug};
use crate::progress::types::*;

/// Longer names are free text rather than topic labels.
pub const MAX_TOPIC_NAME_BYTES: usize = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopicEvidence {
    pub named_strength: bool,
    pub named_weakness: bool,
    pub competent_focus: bool,
}

impl TopicEvidence {
    pub fn is_failure(&self) -> bool {
        self.named_weakness
    }

    pub fn is_success(&self) -> bool {
        !self.is_failure() && (self.named_strength || self.competent_focus)
    }
}

/// Topics touched by a lesson: the focus area followed by each target skill.
pub fn lesson_topics(lesson: &LessonModel) -> Vec<String> {
    let names = std::iter::once(&lesson.focus_area).chain(lesson.target_skills.iter());
    dedup_normalized(names)
}

pub fn assessment_topics(assessment: &AssessmentLesson) -> Vec<String> {
    dedup_normalized(assessment.proposed_topics.iter())
}

fn dedup_normalized<'a>(names: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let normalized = normalize_topic_name(name);
        if normalized.is_empty() || normalized.len() > MAX_TOPIC_NAME_BYTES {
            continue;
        }
        if !out.contains(&normalized) {
            out.push(normalized);
        }
    }
    out
}

fn named_in(labels: &[String], slug: &str) -> bool {
    labels.iter().any(|label| topic_slug(label) == slug)
}

pub fn gather_evidence(
    topic_name: &str,
    signal: &PerformanceSignal,
    focus_area: Option<&str>,
    config: &TopicMasteryConfig,
) -> TopicEvidence {
    let slug = topic_slug(topic_name);
    let is_focus = focus_area.is_some_and(|focus| topic_slug(focus) == slug);
    let competent = signal
        .effective_overall()
        .is_some_and(|score| score >= config.competence_threshold);

    TopicEvidence {
        named_strength: named_in(&signal.strengths, &slug),
        named_weakness: named_in(&signal.weaknesses, &slug),
        competent_focus: is_focus && competent,
    }
}

/// One transition of the topic state machine.
///
/// Failure pulls `Known`/`Mastered` back to `Learning`; success moves up one
/// level; a bare encounter only lifts `Unknown` to `Learning`.
pub fn transition(current: MasteryLevel, evidence: &TopicEvidence) -> MasteryLevel {
    if evidence.is_failure() {
        return match current {
            MasteryLevel::Known | MasteryLevel::Mastered => MasteryLevel::Learning,
            other => other.raise_to(MasteryLevel::Learning),
        };
    }
    if evidence.is_success() {
        return current.next();
    }
    current.raise_to(MasteryLevel::Learning)
}

/// Builds the upsert for one implicated topic. `topic_name` must already be normalized.
pub fn update_topic(
    prior: Option<&TopicProgress>,
    topic_name: &str,
    signal: &PerformanceSignal,
    focus_area: Option<&str>,
    config: &TopicMasteryConfig,
) -> TopicProgressPatch {
    let current = prior.map(|t| t.mastery_level).unwrap_or_default();
    let evidence = gather_evidence(topic_name, signal, focus_area, config);
    let next = transition(current, &evidence);

    if next != current {
        tracing::debug!(
            topic = topic_name,
            from = ?current,
            to = ?next,
            "Topic mastery transition"
        );
    }

    let (lesson_ids, assessment_ids) = match signal.source {
        SignalSource::Lesson => (vec![signal.source_id.clone()], Vec::new()),
        SignalSource::Assessment => (Vec::new(), vec![signal.source_id.clone()]),
    };

    TopicProgressPatch {
        topic_name: topic_name.to_string(),
        mastery_level: next,
        related_lesson_ids: lesson_ids,
        related_assessment_ids: assessment_ids,
    }
}
