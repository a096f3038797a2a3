//! Field-level validation shared by every create/update payload.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

pub const TITLE_MAX_LEN: usize = 255;
pub const USERNAME_MAX_LEN: usize = 150;
pub const PASSWORD_MIN_LEN: usize = 8;

/// Field name → messages. Serializes as `{"title": ["..."]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(())` when nothing was recorded, otherwise the collected errors.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(", "))?;
        }
        Ok(())
    }
}

/// Trims a required title-like field and records an error if it is blank or
/// too long. Returns the trimmed value either way.
pub fn clean_title(errors: &mut ValidationErrors, field: &str, raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.add(field, "This field may not be blank.");
    } else if trimmed.chars().count() > TITLE_MAX_LEN {
        errors.add(
            field,
            format!("Ensure this field has no more than {TITLE_MAX_LEN} characters."),
        );
    }
    trimmed.to_string()
}

/// Comment text only has to be non-blank.
pub fn clean_text(errors: &mut ValidationErrors, field: &str, raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.add(field, "This field may not be blank.");
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_is_rejected() {
        let mut errors = ValidationErrors::new();
        let title = clean_title(&mut errors, "title", "   ");
        assert_eq!(title, "");
        assert!(errors.get("title").is_some());
    }

    #[test]
    fn long_title_is_rejected() {
        let mut errors = ValidationErrors::new();
        clean_title(&mut errors, "title", &"x".repeat(TITLE_MAX_LEN + 1));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn title_is_trimmed() {
        let mut errors = ValidationErrors::new();
        assert_eq!(clean_title(&mut errors, "title", "  Work "), "Work");
        assert!(errors.is_empty());
    }

    #[test]
    fn serializes_as_field_map() {
        let mut errors = ValidationErrors::new();
        errors.add("board", "Board not found.");
        errors.add("title", "This field may not be blank.");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "board": ["Board not found."],
                "title": ["This field may not be blank."],
            })
        );
        assert_eq!(
            errors.to_string(),
            "board: Board not found.; title: This field may not be blank."
        );
    }
}
