//! Input validation for submitted forms.
//!
//! Each check inspects one field and reports the violated constraint. Callers
//! validate fields in form order and stop at the first failure.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

pub const MIN_NAME_CHARS: usize = 2;
pub const MIN_PASSWORD_CHARS: usize = 8;
pub const MIN_TITLE_CHARS: usize = 5;
pub const MIN_CONTENT_CHARS: usize = 100;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Validation error with the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub constraint: String,
}

impl ValidationError {
    pub fn new(field: &'static str, constraint: impl Into<String>) -> Self {
        Self {
            field,
            constraint: constraint.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.constraint)
    }
}

impl std::error::Error for ValidationError {}

fn min_chars(field: &'static str, value: &str, min: usize) -> Result<(), ValidationError> {
    let count = value.chars().count();
    if count < min {
        return Err(ValidationError::new(
            field,
            format!("must be at least {min} characters (got {count})"),
        ));
    }
    Ok(())
}

/// Display names: at least two characters once surrounding whitespace is removed.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    min_chars("name", name.trim(), MIN_NAME_CHARS)
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if !EMAIL_PATTERN.is_match(email.trim()) {
        return Err(ValidationError::new("email", "must be a valid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    min_chars("password", password, MIN_PASSWORD_CHARS)
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    min_chars("title", title.trim(), MIN_TITLE_CHARS)
}

/// Cover images must be absolute URLs.
pub fn validate_cover_image(cover_image: &str) -> Result<(), ValidationError> {
    Url::parse(cover_image.trim())
        .map(|_| ())
        .map_err(|e| ValidationError::new("coverImage", format!("must be a valid URL ({e})")))
}

pub fn validate_content(content: &str) -> Result<(), ValidationError> {
    min_chars("content", content, MIN_CONTENT_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed_before_counting() {
        assert!(validate_name("Al").is_ok());
        assert_eq!(validate_name("  A  ").unwrap_err().field, "name");
    }

    #[test]
    fn email_requires_local_domain_and_tld() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("ada@example").is_err());
        assert!(validate_email("ada example.com").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn password_needs_eight_characters() {
        assert!(validate_password("12345678").is_ok());
        let err = validate_password("1234567").unwrap_err();
        assert_eq!(err.to_string(), "password: must be at least 8 characters (got 7)");
    }

    #[test]
    fn cover_image_must_be_absolute_url() {
        assert!(validate_cover_image("https://images.example.com/a.png").is_ok());
        assert!(validate_cover_image("/relative/a.png").is_err());
        assert!(validate_cover_image("not a url").is_err());
    }

    #[test]
    fn post_field_minimums() {
        assert!(validate_title("Hello").is_ok());
        assert!(validate_title("Hey").is_err());
        assert!(validate_content(&"a".repeat(100)).is_ok());
        assert_eq!(validate_content(&"a".repeat(99)).unwrap_err().field, "content");
    }
}
