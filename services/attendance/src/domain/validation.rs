//! Stateless checks run by callers before they invoke a mutating operation.
//!
//! The data API itself does not call these; a write that skips validation is
//! stored as given.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::types::{NewClass, NewStudent, NewUser};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Class name is required")]
    ClassNameRequired,
    #[error("Subject is required")]
    SubjectRequired,
    #[error("Student name is required")]
    StudentNameRequired,
    #[error("Valid email is required")]
    EmailInvalid,
    #[error("Class selection is required")]
    ClassRequired,
    #[error("Username is required")]
    UsernameRequired,
    #[error("Password is required")]
    PasswordRequired,
}

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// `YYYY-MM-DD` shape check, as required by imports. Calendar validity is
/// checked separately when the value is parsed.
pub fn is_iso_date(value: &str) -> bool {
    ISO_DATE_RE.is_match(value)
}

pub fn validate_class_data(data: &NewClass) -> Result<(), ValidationError> {
    if is_blank(&data.name) {
        return Err(ValidationError::ClassNameRequired);
    }
    if is_blank(&data.subject) {
        return Err(ValidationError::SubjectRequired);
    }
    Ok(())
}

pub fn validate_student_data(data: &NewStudent) -> Result<(), ValidationError> {
    if is_blank(&data.name) {
        return Err(ValidationError::StudentNameRequired);
    }
    if !validate_email(&data.email) {
        return Err(ValidationError::EmailInvalid);
    }
    if data.class_id.is_empty() {
        return Err(ValidationError::ClassRequired);
    }
    Ok(())
}

pub fn validate_user_data(data: &NewUser) -> Result<(), ValidationError> {
    if is_blank(&data.username) {
        return Err(ValidationError::UsernameRequired);
    }
    if data.password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    Ok(())
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
