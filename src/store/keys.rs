use crate::store::StoreError;

const MAX_KEY_COMPONENT_BYTES: usize = 512;

fn validate_component(field: &str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation(format!("{field} must not be empty")));
    }
    if value.len() > MAX_KEY_COMPONENT_BYTES {
        return Err(StoreError::Validation(format!(
            "{field} exceeds {MAX_KEY_COMPONENT_BYTES} bytes"
        )));
    }
    Ok(())
}

pub fn learning_progress_key(user_id: &str) -> Result<String, StoreError> {
    validate_component("user id", user_id)?;
    Ok(user_id.to_string())
}

pub fn progress_id_key(progress_id: &str) -> Result<String, StoreError> {
    validate_component("learning progress id", progress_id)?;
    Ok(progress_id.to_string())
}

// Topic keys
pub fn topic_progress_key(progress_id: &str, topic_name: &str) -> Result<String, StoreError> {
    validate_component("topic name", topic_name)?;
    Ok(format!("{}{}", progress_child_prefix(progress_id)?, topic_name))
}

// Word keys
pub fn word_progress_key(progress_id: &str, word: &str) -> Result<String, StoreError> {
    validate_component("word", word)?;
    Ok(format!("{}{}", progress_child_prefix(progress_id)?, word))
}

/// Prefix shared by all topic and word records of one progress aggregate.
pub fn progress_child_prefix(progress_id: &str) -> Result<String, StoreError> {
    validate_component("learning progress id", progress_id)?;
    if progress_id.contains(':') {
        return Err(StoreError::Validation(
            "learning progress id must not contain ':'".to_string(),
        ));
    }
    Ok(format!("{}:", progress_id))
}
