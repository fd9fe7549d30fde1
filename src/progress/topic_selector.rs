//! Ranks candidate topics for the next lessons from assessment proposals,
//! weak tracked topics, beginner basics and the declared learning purpose.

use std::cmp::Ordering;

use crate::progress::config::TopicSelectionConfig;
use crate::progress::slug::topic_slug;
use crate::progress::types::*;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTopic {
    pub slug: String,
    pub weight: f64,
    /// Position at which the candidate was first suggested.
    pub first_seen: usize,
}

fn weight_desc(a: &ScoredTopic, b: &ScoredTopic) -> Ordering {
    b.weight
        .partial_cmp(&a.weight)
        .unwrap_or(Ordering::Equal)
        .then(a.first_seen.cmp(&b.first_seen))
}

#[derive(Debug, Default)]
struct Candidates {
    topics: Vec<ScoredTopic>,
}

impl Candidates {
    fn add(&mut self, name: &str, weight: f64) {
        let slug = topic_slug(name);
        if slug.is_empty() || weight <= 0.0 {
            return;
        }
        if let Some(existing) = self.topics.iter_mut().find(|t| t.slug == slug) {
            existing.weight += weight;
            return;
        }
        let first_seen = self.topics.len();
        self.topics.push(ScoredTopic {
            slug,
            weight,
            first_seen,
        });
    }
}

/// Proficiency the beginner-basics rule looks at: tracked progress wins, then
/// the declared onboarding level, then `Beginner`.
pub fn effective_proficiency(context: &SelectionContext) -> ProficiencyLevel {
    if let Some(progress) = &context.progress {
        return progress.estimated_proficiency_level;
    }
    context
        .preferences
        .as_ref()
        .and_then(|p| p.proficiency_level.as_deref())
        .and_then(ProficiencyLevel::from_label)
        .unwrap_or_default()
}

/// Scores every candidate topic, highest weight first.
pub fn score_topics(context: &SelectionContext, config: &TopicSelectionConfig) -> Vec<ScoredTopic> {
    let mut candidates = Candidates::default();

    for name in &context.assessment_topics {
        candidates.add(name, config.assessment_weight);
    }

    // Weight grows with the distance below Known.
    if let Some(progress) = &context.progress {
        for topic in &progress.topics {
            let gap = topic.mastery_level.levels_below_known();
            if gap > 0 {
                candidates.add(&topic.topic_name, config.weak_topic_weight * f64::from(gap));
            }
        }
    }

    if effective_proficiency(context) == ProficiencyLevel::Beginner {
        for name in &config.beginner_basics {
            candidates.add(name, config.beginner_basics_weight);
        }
    }

    if let Some(purpose) = context
        .preferences
        .as_ref()
        .and_then(|p| p.learning_purpose.as_deref())
    {
        let purpose = purpose.to_lowercase();
        for group in &config.purpose_topics {
            let matched = group
                .keywords
                .iter()
                .any(|keyword| purpose.contains(&keyword.to_lowercase()));
            if matched {
                for name in &group.topics {
                    candidates.add(name, config.purpose_weight);
                }
            }
        }
    }

    let mut scored = candidates.topics;
    scored.sort_by(weight_desc);
    scored
}

/// Top `topic_count` distinct slugs. Pure; no I/O.
pub fn select_topics(context: &SelectionContext, config: &TopicSelectionConfig) -> Vec<String> {
    score_topics(context, config)
        .into_iter()
        .take(config.topic_count)
        .map(|t| t.slug)
        .collect()
}
