use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    /// Weight kept from the stored overall score on each update.
    pub prior_weight: f64,
    /// Weight given to the incoming signal's overall score.
    pub signal_weight: f64,
    /// Score gain (points) at or above which the trajectory is accelerating.
    pub accelerating_delta: f64,
    /// Score loss (points, positive number) at or above which the trajectory is declining.
    pub declining_delta: f64,
    /// Upper bound on stored strength/weakness labels each.
    #[serde(default = "default_max_labels")]
    pub max_labels: usize,
    /// Blended overall score from which the estimate is at least intermediate.
    #[serde(default = "default_intermediate_min_score")]
    pub intermediate_min_score: f64,
    /// Blended overall score from which the estimate is advanced.
    #[serde(default = "default_advanced_min_score")]
    pub advanced_min_score: f64,
}

fn default_max_labels() -> usize {
    50
}

fn default_intermediate_min_score() -> f64 {
    60.0
}

fn default_advanced_min_score() -> f64 {
    85.0
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            prior_weight: 0.3,
            signal_weight: 0.7,
            accelerating_delta: 5.0,
            declining_delta: 5.0,
            max_labels: 50,
            intermediate_min_score: default_intermediate_min_score(),
            advanced_min_score: default_advanced_min_score(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicMasteryConfig {
    /// Lesson overall score that advances the lesson's focus area.
    pub competence_threshold: f64,
}

impl Default for TopicMasteryConfig {
    fn default() -> Self {
        Self {
            competence_threshold: 70.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordMasteryConfig {
    pub known_streak: u32,
    pub mastered_streak: u32,
}

impl Default for WordMasteryConfig {
    fn default() -> Self {
        Self {
            known_streak: 3,
            mastered_streak: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurposeTopics {
    /// Matched case-insensitively as a substring of the declared purpose.
    pub keywords: Vec<String>,
    pub topics: Vec<String>,
}

impl PurposeTopics {
    fn new(keywords: &[&str], topics: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            topics: topics.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSelectionConfig {
    pub topic_count: usize,
    pub assessment_weight: f64,
    /// Multiplied by the number of levels a topic sits below `Known`.
    pub weak_topic_weight: f64,
    pub beginner_basics_weight: f64,
    pub purpose_weight: f64,
    pub beginner_basics: Vec<String>,
    pub purpose_topics: Vec<PurposeTopics>,
}

impl Default for TopicSelectionConfig {
    fn default() -> Self {
        Self {
            topic_count: 3,
            assessment_weight: 2.0,
            weak_topic_weight: 0.5,
            beginner_basics_weight: 1.5,
            purpose_weight: 1.0,
            beginner_basics: vec![
                "greetings-and-introductions".to_string(),
                "numbers-and-counting".to_string(),
                "everyday-phrases".to_string(),
            ],
            purpose_topics: vec![
                PurposeTopics::new(
                    &["travel", "trip", "vacation", "holiday"],
                    &["travel-vocabulary", "directions-and-transport", "ordering-food"],
                ),
                PurposeTopics::new(
                    &["business", "work", "career", "job", "professional"],
                    &["business-vocabulary", "formal-introductions", "meetings-and-emails"],
                ),
                PurposeTopics::new(
                    &["study", "school", "academic", "university", "exam"],
                    &["academic-vocabulary", "reading-comprehension", "formal-writing"],
                ),
                PurposeTopics::new(
                    &["family", "friend", "social", "conversation", "relationship"],
                    &["small-talk", "family-and-relationships", "hobbies-and-interests"],
                ),
                PurposeTopics::new(
                    &["culture", "media", "movie", "music", "literature"],
                    &["culture-and-traditions", "media-and-entertainment", "idioms-and-expressions"],
                ),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressConfig {
    pub scoring: ScoringConfig,
    pub topic_mastery: TopicMasteryConfig,
    pub word_mastery: WordMasteryConfig,
    #[serde(default)]
    pub topic_selection: TopicSelectionConfig,
}

impl ProgressConfig {
    pub fn from_env(env_config: &crate::config::ProgressEnvConfig) -> Self {
        let mut config = Self::default();
        config.scoring.accelerating_delta = env_config.trajectory_delta;
        config.scoring.declining_delta = env_config.trajectory_delta;
        config.topic_mastery.competence_threshold = env_config.competence_threshold;
        config.word_mastery.known_streak = env_config.word_known_streak;
        config.word_mastery.mastered_streak = env_config.word_mastered_streak;
        config.topic_selection.topic_count = env_config.topic_count;
        config
    }

    pub fn validate(&self) -> Result<(), String> {
        let s = &self.scoring;
        if !(0.0..=1.0).contains(&s.prior_weight) || !(0.0..=1.0).contains(&s.signal_weight) {
            return Err("scoring weights must be in [0,1]".to_string());
        }
        let weight_sum = s.prior_weight + s.signal_weight;
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(format!(
                "scoring.prior_weight + scoring.signal_weight must equal 1.0 (got {weight_sum:.3})"
            ));
        }
        let deltas_valid = [s.accelerating_delta, s.declining_delta]
            .iter()
            .all(|d| d.is_finite() && *d >= 0.0);
        if !deltas_valid {
            return Err("trajectory deltas must be finite and >= 0".to_string());
        }
        if s.max_labels == 0 {
            return Err("scoring.max_labels must be > 0".to_string());
        }
        if !(0.0..=100.0).contains(&s.intermediate_min_score)
            || !(0.0..=100.0).contains(&s.advanced_min_score)
            || s.advanced_min_score < s.intermediate_min_score
        {
            return Err(
                "proficiency score bands must satisfy 0 <= intermediate <= advanced <= 100"
                    .to_string(),
            );
        }

        if !(0.0..=100.0).contains(&self.topic_mastery.competence_threshold) {
            return Err("topic_mastery.competence_threshold must be in [0,100]".to_string());
        }

        let w = &self.word_mastery;
        if w.known_streak == 0 {
            return Err("word_mastery.known_streak must be >= 1".to_string());
        }
        if w.mastered_streak < w.known_streak {
            return Err("word_mastery.mastered_streak must be >= known_streak".to_string());
        }

        let t = &self.topic_selection;
        if t.topic_count == 0 {
            return Err("topic_selection.topic_count must be >= 1".to_string());
        }
        let weights_valid = [
            t.assessment_weight,
            t.weak_topic_weight,
            t.beginner_basics_weight,
            t.purpose_weight,
        ]
        .iter()
        .all(|w| w.is_finite() && *w >= 0.0);
        if !weights_valid {
            return Err("topic_selection weights must be finite and >= 0".to_string());
        }

        Ok(())
    }
}
