//! Canonical forms for the free-text fields stored with a task.

use crate::contract::model::TaskFields;
use crate::domain::validation::is_absent;

pub const DEFAULT_PRIORITY: &str = "Medium";
pub const DEFAULT_TAG: &str = "OTHER";

/// `High`, `Medium` or `Low`; anything else becomes [`DEFAULT_PRIORITY`].
pub fn normalize_priority(value: &str) -> String {
    match value.trim().to_ascii_lowercase().as_str() {
        "high" => "High",
        "low" => "Low",
        _ => DEFAULT_PRIORITY,
    }
    .to_string()
}

/// Upper-cased tag, [`DEFAULT_TAG`] when not given.
pub fn normalize_tag(value: &str) -> String {
    if is_absent(value) {
        DEFAULT_TAG.to_string()
    } else {
        value.trim().to_uppercase()
    }
}

/// Shape validated fields for storage.
pub fn for_storage(mut fields: TaskFields) -> TaskFields {
    fields.task_title = fields.task_title.trim().to_string();
    fields.description = fields.description.trim().to_string();
    fields.priority = normalize_priority(&fields.priority);
    fields.tag = normalize_tag(&fields.tag);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_is_case_insensitive_with_medium_fallback() {
        assert_eq!(normalize_priority("HIGH"), "High");
        assert_eq!(normalize_priority(" low "), "Low");
        assert_eq!(normalize_priority("medium"), "Medium");
        assert_eq!(normalize_priority("F"), "Medium");
        assert_eq!(normalize_priority("urgent"), "Medium");
    }

    #[test]
    fn tag_is_uppercased_with_other_fallback() {
        assert_eq!(normalize_tag("work"), "WORK");
        assert_eq!(normalize_tag(" Study "), "STUDY");
        assert_eq!(normalize_tag(""), "OTHER");
        assert_eq!(normalize_tag("F"), "OTHER");
    }

    #[test]
    fn storage_shape_trims_title() {
        let f = for_storage(TaskFields {
            task_title: "  Gym  ".into(),
            priority: "high".into(),
            ..Default::default()
        });
        assert_eq!(f.task_title, "Gym");
        assert_eq!(f.priority, "High");
        assert_eq!(f.tag, "OTHER");
    }
}
