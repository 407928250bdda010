//! Input validation utilities

use common::error::{FieldError, reject_null_characters};
use regex::Regex;
use std::sync::OnceLock;

const MAX_EMAIL_LENGTH: usize = 255;
const MAX_NAME_LENGTH: usize = 255;
const MIN_PASSWORD_LENGTH: usize = 5;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Lowercase the domain part of an email address; the local part is kept as is
pub fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Validate an email and return it normalized
pub fn validate_email(email: &str) -> Result<String, FieldError> {
    reject_null_characters("email", email)?;
    let email = email.trim();

    if email.is_empty() {
        return Err(FieldError::new("email", "This field may not be blank."));
    }

    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Err(FieldError::new(
            "email",
            format!("Ensure this field has no more than {MAX_EMAIL_LENGTH} characters."),
        ));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err(FieldError::new("email", "Enter a valid email address."));
    }

    Ok(normalize_email(email))
}

/// Validate password length; the password is used exactly as sent
pub fn validate_password(password: &str) -> Result<(), FieldError> {
    let length = password.chars().count();

    if length < MIN_PASSWORD_LENGTH {
        return Err(FieldError::new(
            "password",
            format!("Ensure this field has at least {MIN_PASSWORD_LENGTH} characters."),
        ));
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(FieldError::new(
            "password",
            format!("Ensure this field has no more than {MAX_PASSWORD_LENGTH} characters."),
        ));
    }

    Ok(())
}

/// Validate a display name and return it trimmed
pub fn validate_name(name: &str) -> Result<String, FieldError> {
    reject_null_characters("name", name)?;
    let name = name.trim();

    if name.is_empty() {
        return Err(FieldError::new("name", "This field may not be blank."));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(FieldError::new(
            "name",
            format!("Ensure this field has no more than {MAX_NAME_LENGTH} characters."),
        ));
    }

    Ok(name.to_string())
}
