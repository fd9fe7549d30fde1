pub const LEARNING_PROGRESS: &str = "learning_progress";
pub const TOPIC_PROGRESS: &str = "topic_progress";
pub const WORD_PROGRESS: &str = "word_progress";
pub const CONFIG_VERSIONS: &str = "config_versions";

// Secondary index trees
pub const PROGRESS_BY_ID: &str = "progress_by_id";
