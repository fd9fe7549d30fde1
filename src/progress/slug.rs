//! Canonical keys for topics and words.
//!
//! Topic names arrive from generated lessons, assessments and onboarding in
//! whatever casing the generator produced ("Travel Vocabulary",
//! "travel  vocabulary", "travel-vocabulary"). All of those spellings share
//! one record key (space-separated) and one slug (hyphen-separated).

fn topic_parts(name: &str) -> impl Iterator<Item = String> + '_ {
    name.split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(|part| part.to_lowercase())
}

/// Record key of a topic: lower-case words joined by single spaces. Hyphens
/// and underscores separate words, so a slug maps back to the same key.
pub fn normalize_topic_name(name: &str) -> String {
    topic_parts(name).collect::<Vec<_>>().join(" ")
}

/// Lower-case, hyphen-separated form. Idempotent.
pub fn topic_slug(name: &str) -> String {
    topic_parts(name).collect::<Vec<_>>().join("-")
}

/// Words keep their inner punctuation ("E-Mail", "guten Tag!") but lose
/// surrounding whitespace and case.
pub fn normalize_word(text: &str) -> String {
    text.split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_names_ignore_case_and_spacing() {
        assert_eq!(normalize_topic_name("  Travel   Vocabulary "), "travel vocabulary");
        assert_eq!(
            normalize_topic_name("Travel Vocabulary"),
            normalize_topic_name("travel vocabulary")
        );
    }

    #[test]
    fn slug_form_maps_to_the_same_record_key() {
        assert_eq!(normalize_topic_name("travel-vocabulary"), "travel vocabulary");
        assert_eq!(normalize_topic_name("Basic_Grammar"), "basic grammar");
        for name in ["Travel Vocabulary", "travel-vocabulary", "TRAVEL_vocabulary "] {
            assert_eq!(topic_slug(&normalize_topic_name(name)), topic_slug(name));
        }
    }

    #[test]
    fn words_keep_inner_hyphens() {
        assert_eq!(normalize_word("  E-Mail "), "e-mail");
        assert_eq!(normalize_word("Guten   Tag"), "guten tag");
    }

    #[test]
    fn slug_is_hyphenated_and_idempotent() {
        assert_eq!(topic_slug("Travel Vocabulary"), "travel-vocabulary");
        assert_eq!(topic_slug("travel-vocabulary"), "travel-vocabulary");
        assert_eq!(topic_slug("Basic_Grammar  rules"), "basic-grammar-rules");
        assert_eq!(topic_slug(&topic_slug("Ordering Food")), "ordering-food");
        assert_eq!(topic_slug("   "), "");
    }
}
