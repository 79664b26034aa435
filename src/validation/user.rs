use std::{fmt, sync::LazyLock};

use regex::Regex;

use super::{BLANK, INVALID, ValidationErrors, check_required_text, is_blank, too_long};

pub const MAX_NAME_CHARS: usize = 50;
pub const MAX_EMAIL_CHARS: usize = 255;
pub const MAX_PASSWORD_CHARS: usize = 6;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\A[[:word:]+\-.]+@[a-z0-9\-.]+\.[a-z]+\z").expect("email pattern compiles")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Registration input. The password is required here; on updates it is
/// optional (see [`UserChanges`]).
#[derive(Clone, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: Option<String>,
}

impl NewUser {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            password_confirmation: None,
        }
    }

    pub fn with_confirmation(mut self, confirmation: impl Into<String>) -> Self {
        self.password_confirmation = Some(confirmation.into());
        self
    }

    /// Field rules only; email uniqueness needs storage and is checked by the
    /// user service.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        check_required_text(&mut errors, "name", &self.name, MAX_NAME_CHARS);
        check_email(&mut errors, &self.email);
        check_password(
            &mut errors,
            &self.password,
            self.password_confirmation.as_deref(),
        );
        errors
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Partial profile update. `None` leaves the stored value alone; a missing
/// password is not an error.
#[derive(Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }

    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Some(name) = self.name.as_deref() {
            check_required_text(&mut errors, "name", name, MAX_NAME_CHARS);
        }
        if let Some(email) = self.email.as_deref() {
            check_email(&mut errors, email);
        }
        if let Some(password) = self.password.as_deref() {
            check_password(&mut errors, password, self.password_confirmation.as_deref());
        }
        errors
    }
}

impl fmt::Debug for UserChanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserChanges")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .finish_non_exhaustive()
    }
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if is_blank(email) {
        errors.add("email", BLANK);
    }
    if email.chars().count() > MAX_EMAIL_CHARS {
        errors.add("email", too_long(MAX_EMAIL_CHARS));
    }
    if !is_valid_email(email) {
        errors.add("email", INVALID);
    }
}

fn check_password(errors: &mut ValidationErrors, password: &str, confirmation: Option<&str>) {
    if is_blank(password) {
        errors.add("password", BLANK);
    }
    if password.chars().count() > MAX_PASSWORD_CHARS {
        errors.add("password", too_long(MAX_PASSWORD_CHARS));
    }
    if confirmation.is_some_and(|confirmation| confirmation != password) {
        errors.add("password_confirmation", "doesn't match Password");
    }
}
