//! Field-level validation errors and the rules shared by every record.
//!
//! Validation never fails fast: each rule appends to a [`ValidationErrors`]
//! and the caller decides whether the record may be persisted.

mod micropost;
mod user;

use std::fmt;

use serde::Serialize;

pub use micropost::{MAX_CONTENT_CHARS, NewMicropost};
pub use user::{
    MAX_EMAIL_CHARS, MAX_NAME_CHARS, MAX_PASSWORD_CHARS, NewUser, UserChanges, is_valid_email,
};

pub const BLANK: &str = "can't be blank";
pub const INVALID: &str = "is invalid";
pub const TAKEN: &str = "has already been taken";
pub const MUST_EXIST: &str = "must exist";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Ordered collection of field → message pairs, in the order rules ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.iter().any(|err| err.field == field)
    }

    /// Messages recorded for one field.
    pub fn on(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|err| err.field == field)
            .map(|err| err.message.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Messages prefixed with the humanized field name, e.g. "Name can't be blank".
    pub fn full_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|err| format!("{} {}", humanize(err.field), err.message))
            .collect()
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_messages().join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

fn humanize(field: &str) -> String {
    let base = field.strip_suffix("_id").unwrap_or(field).replace('_', " ");
    let mut chars = base.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Blank means empty or whitespace only.
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub(crate) fn too_long(max: usize) -> String {
    format!("is too long (maximum is {max} characters)")
}

/// Presence plus an upper bound counted in characters.
pub(crate) fn check_required_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    max_chars: usize,
) {
    if is_blank(value) {
        errors.add(field, BLANK);
    }
    if value.chars().count() > max_chars {
        errors.add(field, too_long(max_chars));
    }
}

#[cfg(test)]
mod tests {
    use super::{BLANK, ValidationErrors, humanize};

    #[test]
    fn full_messages_humanize_field_names() {
        let mut errors = ValidationErrors::new();
        errors.add("name", BLANK);
        errors.add("password_confirmation", "doesn't match Password");
        errors.add("user_id", "must exist");

        assert_eq!(
            errors.full_messages(),
            vec![
                "Name can't be blank",
                "Password confirmation doesn't match Password",
                "User must exist",
            ]
        );
    }

    #[test]
    fn on_returns_messages_for_a_single_field() {
        let mut errors = ValidationErrors::new();
        errors.add("email", BLANK);
        errors.add("email", "is invalid");
        errors.add("name", BLANK);

        assert_eq!(errors.on("email"), vec![BLANK, "is invalid"]);
        assert!(errors.contains("name"));
        assert!(!errors.contains("password"));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn into_result_is_ok_only_when_empty() {
        assert!(ValidationErrors::new().into_result().is_ok());

        let mut errors = ValidationErrors::new();
        errors.add("content", BLANK);
        let err = errors.into_result().expect_err("errors present");
        assert_eq!(err.to_string(), "Content can't be blank");
    }

    #[test]
    fn serializes_as_field_message_pairs() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "has already been taken");

        let json = serde_json::to_value(&errors).expect("serializes");
        assert_eq!(
            json,
            serde_json::json!([{ "field": "email", "message": "has already been taken" }])
        );
    }

    #[test]
    fn humanize_handles_empty_and_simple_names() {
        assert_eq!(humanize(""), "");
        assert_eq!(humanize("email"), "Email");
    }
}
