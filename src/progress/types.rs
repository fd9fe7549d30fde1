use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_SCORE;
    }
    value.clamp(MIN_SCORE, MAX_SCORE)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProficiencyLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl ProficiencyLevel {
    /// Maps CEFR codes and plain level names onto the internal scale.
    /// Labels such as "B2 - Upper Intermediate" are read from their first token.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_lowercase();
        let head = normalized
            .split(|c: char| c.is_whitespace() || c == '-' || c == '/' || c == '(')
            .find(|part| !part.is_empty())?;

        match head {
            "a1" | "a2" | "beginner" | "elementary" | "novice" => Some(Self::Beginner),
            "b1" | "b2" | "intermediate" => Some(Self::Intermediate),
            "c1" | "c2" | "advanced" | "proficient" | "fluent" | "native" => Some(Self::Advanced),
            "upper" | "lower" => Self::from_label(&normalized[head.len()..]),
            _ => None,
        }
    }

    /// The only way a stored level changes: it moves up to `candidate` or stays put.
    pub fn raise_to(self, candidate: Self) -> Self {
        self.max(candidate)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningTrajectory {
    Accelerating,
    #[default]
    Steady,
    Declining,
}

impl LearningTrajectory {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "accelerating" | "improving" | "rising" => Some(Self::Accelerating),
            "steady" | "stable" | "plateauing" | "plateau" => Some(Self::Steady),
            "declining" | "regressing" | "falling" => Some(Self::Declining),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MasteryLevel {
    #[default]
    Unknown,
    Learning,
    Known,
    Mastered,
}

impl MasteryLevel {
    pub fn rank(&self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Learning => 1,
            Self::Known => 2,
            Self::Mastered => 3,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Unknown => Self::Learning,
            Self::Learning => Self::Known,
            Self::Known | Self::Mastered => Self::Mastered,
        }
    }

    pub fn raise_to(self, candidate: Self) -> Self {
        self.max(candidate)
    }

    /// Number of levels separating this level from `Known`; zero at or above it.
    pub fn levels_below_known(&self) -> u8 {
        Self::Known.rank().saturating_sub(self.rank())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningProgress {
    pub id: String,
    pub user_id: String,
    pub estimated_proficiency_level: ProficiencyLevel,
    pub overall_score: f64,
    pub learning_trajectory: LearningTrajectory,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub last_lesson_completed_at: Option<DateTime<Utc>>,
    pub last_assessment_completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<TopicProgress>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub words: Vec<WordProgress>,
}

impl LearningProgress {
    pub fn new(user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            estimated_proficiency_level: ProficiencyLevel::default(),
            overall_score: 0.0,
            learning_trajectory: LearningTrajectory::default(),
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            last_lesson_completed_at: None,
            last_assessment_completed_at: None,
            created_at: now,
            updated_at: now,
            topics: Vec::new(),
            words: Vec::new(),
        }
    }

    pub fn apply_patch(&mut self, patch: &LearningProgressPatch) {
        if let Some(level) = patch.estimated_proficiency_level {
            self.estimated_proficiency_level = level;
        }
        if let Some(score) = patch.overall_score {
            self.overall_score = clamp_score(score);
        }
        if let Some(trajectory) = patch.learning_trajectory {
            self.learning_trajectory = trajectory;
        }
        if let Some(strengths) = &patch.strengths {
            self.strengths = strengths.clone();
        }
        if let Some(weaknesses) = &patch.weaknesses {
            self.weaknesses = weaknesses.clone();
        }
        if patch.last_lesson_completed_at.is_some() {
            self.last_lesson_completed_at = patch.last_lesson_completed_at;
        }
        if patch.last_assessment_completed_at.is_some() {
            self.last_assessment_completed_at = patch.last_assessment_completed_at;
        }
        self.updated_at = Utc::now();
    }

    pub fn topic(&self, topic_name: &str) -> Option<&TopicProgress> {
        self.topics.iter().find(|t| t.topic_name == topic_name)
    }

    pub fn word(&self, word: &str) -> Option<&WordProgress> {
        self.words.iter().find(|w| w.word == word)
    }
}

/// Partial update of a `LearningProgress`; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningProgressPatch {
    pub estimated_proficiency_level: Option<ProficiencyLevel>,
    pub overall_score: Option<f64>,
    pub learning_trajectory: Option<LearningTrajectory>,
    pub strengths: Option<Vec<String>>,
    pub weaknesses: Option<Vec<String>>,
    pub last_lesson_completed_at: Option<DateTime<Utc>>,
    pub last_assessment_completed_at: Option<DateTime<Utc>>,
}

impl LearningProgressPatch {
    /// The creation payload issued before the first computed update of a user.
    pub fn initial() -> Self {
        Self {
            estimated_proficiency_level: Some(ProficiencyLevel::Beginner),
            overall_score: Some(0.0),
            learning_trajectory: Some(LearningTrajectory::Steady),
            strengths: Some(Vec::new()),
            weaknesses: Some(Vec::new()),
            last_lesson_completed_at: None,
            last_assessment_completed_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgress {
    pub learning_progress_id: String,
    pub topic_name: String,
    pub mastery_level: MasteryLevel,
    pub related_lesson_ids: Vec<String>,
    pub related_assessment_ids: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgressPatch {
    pub topic_name: String,
    pub mastery_level: MasteryLevel,
    /// Appended to the stored set; existing ids are never removed.
    #[serde(default)]
    pub related_lesson_ids: Vec<String>,
    #[serde(default)]
    pub related_assessment_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordProgress {
    pub learning_progress_id: String,
    pub word: String,
    pub translation: Option<String>,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub consecutive_correct: u32,
    pub exposure_count: u32,
    pub mastery_level: MasteryLevel,
    pub last_practiced_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordProgressPatch {
    pub word: String,
    pub translation: Option<String>,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub consecutive_correct: u32,
    pub exposure_count: u32,
    pub mastery_level: MasteryLevel,
    pub last_practiced_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Completion events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonStepType {
    Instruction,
    Prompt,
    NewWord,
    Practice,
    ModelAnswer,
    Feedback,
    Summary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonStep {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub step_type: LessonStepType,
    pub content: String,
    #[serde(default)]
    pub translation: Option<String>,
    #[serde(default)]
    pub expected_answer: Option<String>,
    #[serde(default)]
    pub user_response: Option<String>,
    #[serde(default)]
    pub correct: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStepType {
    Instruction,
    Question,
    Feedback,
    Summary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentStep {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub step_type: AssessmentStepType,
    pub content: String,
    #[serde(default)]
    pub translation: Option<String>,
    #[serde(default)]
    pub expected_answer: Option<String>,
    #[serde(default)]
    pub user_response: Option<String>,
    #[serde(default)]
    pub correct: Option<bool>,
}

/// Text performance metrics attached to a lesson or an assessment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMetrics {
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub pronunciation_score: Option<f64>,
    #[serde(default)]
    pub grammar_score: Option<f64>,
    #[serde(default)]
    pub vocabulary_score: Option<f64>,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioAssessmentSection {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_development: Vec<String>,
}

/// Metrics produced by the speech analysis of a recorded lesson or assessment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioMetrics {
    #[serde(default)]
    pub pronunciation_score: Option<f64>,
    #[serde(default)]
    pub fluency_score: Option<f64>,
    #[serde(default)]
    pub grammar_score: Option<f64>,
    #[serde(default)]
    pub vocabulary_score: Option<f64>,
    #[serde(default)]
    pub overall_performance: Option<f64>,
    #[serde(default)]
    pub proficiency_level: Option<String>,
    #[serde(default)]
    pub learning_trajectory: Option<String>,
    #[serde(default)]
    pub pronunciation_assessment: Option<AudioAssessmentSection>,
    #[serde(default)]
    pub fluency_assessment: Option<AudioAssessmentSection>,
    #[serde(default)]
    pub grammar_assessment: Option<AudioAssessmentSection>,
    #[serde(default)]
    pub vocabulary_assessment: Option<AudioAssessmentSection>,
}

impl AudioMetrics {
    pub fn sections(&self) -> impl Iterator<Item = &AudioAssessmentSection> {
        [
            self.pronunciation_assessment.as_ref(),
            self.fluency_assessment.as_ref(),
            self.grammar_assessment.as_ref(),
            self.vocabulary_assessment.as_ref(),
        ]
        .into_iter()
        .flatten()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonModel {
    pub id: String,
    pub focus_area: String,
    #[serde(default)]
    pub target_skills: Vec<String>,
    #[serde(default)]
    pub steps: Vec<LessonStep>,
    #[serde(default)]
    pub performance_metrics: Option<TextMetrics>,
    #[serde(default)]
    pub audio_metrics: Option<AudioMetrics>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentLesson {
    pub id: String,
    #[serde(default)]
    pub proposed_topics: Vec<String>,
    #[serde(default)]
    pub steps: Vec<AssessmentStep>,
    #[serde(default)]
    pub metrics: Option<TextMetrics>,
    #[serde(default)]
    pub audio_metrics: Option<AudioMetrics>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Signal and selection inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSource {
    Lesson,
    Assessment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSignal {
    pub source: SignalSource,
    pub source_id: String,
    pub occurred_at: DateTime<Utc>,
    pub accuracy: Option<f64>,
    pub pronunciation_score: Option<f64>,
    pub grammar_score: Option<f64>,
    pub vocabulary_score: Option<f64>,
    pub overall_score: Option<f64>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub audio_overall_performance: Option<f64>,
    pub audio_proficiency_level: Option<ProficiencyLevel>,
    pub audio_trajectory: Option<LearningTrajectory>,
}

impl PerformanceSignal {
    /// Overall score driving the aggregate; audio analysis wins over text metrics.
    pub fn effective_overall(&self) -> Option<f64> {
        self.audio_overall_performance.or(self.overall_score)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingPreferences {
    #[serde(default)]
    pub native_language: Option<String>,
    #[serde(default)]
    pub target_language: Option<String>,
    #[serde(default)]
    pub learning_purpose: Option<String>,
    #[serde(default)]
    pub proficiency_level: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionContext {
    #[serde(default)]
    pub progress: Option<LearningProgress>,
    #[serde(default)]
    pub preferences: Option<OnboardingPreferences>,
    #[serde(default)]
    pub assessment_topics: Vec<String>,
}
