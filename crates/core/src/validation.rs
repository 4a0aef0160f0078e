//! Field validators shared by the write DTOs.

use std::sync::LazyLock;

use regex::Regex;

/// Deliberately loose: one `@`, no whitespace, a dot in the domain.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("valid regex"));

/// Maximum length of person and organisation names.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length of free-text notes and descriptions.
pub const MAX_TEXT_LENGTH: usize = 20_000;

/// Maximum length of a phone number string.
pub const MAX_PHONE_LENGTH: usize = 40;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

pub fn validate_email(field: &str, email: &str) -> Result<(), String> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(format!("{field} is not a valid email address"))
    }
}

pub fn validate_optional_email(field: &str, email: Option<&str>) -> Result<(), String> {
    match email {
        Some(e) if !e.trim().is_empty() => validate_email(field, e),
        _ => Ok(()),
    }
}

/// Non-blank and at most `MAX_NAME_LENGTH` characters.
pub fn validate_name(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} cannot be empty"));
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(format!(
            "{field} exceeds maximum length of {MAX_NAME_LENGTH} characters"
        ));
    }
    Ok(())
}

pub fn validate_optional_text(field: &str, value: Option<&str>) -> Result<(), String> {
    match value {
        Some(v) if v.chars().count() > MAX_TEXT_LENGTH => Err(format!(
            "{field} exceeds maximum length of {MAX_TEXT_LENGTH} characters"
        )),
        _ => Ok(()),
    }
}

pub fn validate_optional_phone(value: Option<&str>) -> Result<(), String> {
    let Some(phone) = value else {
        return Ok(());
    };
    if phone.chars().count() > MAX_PHONE_LENGTH {
        return Err(format!(
            "Phone number exceeds maximum length of {MAX_PHONE_LENGTH} characters"
        ));
    }
    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
    {
        return Err("Phone number contains invalid characters".to_string());
    }
    Ok(())
}

/// Reject negative amounts of money or counts.
pub fn validate_non_negative(field: &str, value: Option<i64>) -> Result<(), String> {
    match value {
        Some(v) if v < 0 => Err(format!("{field} cannot be negative")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_email() {
        assert!(is_valid_email("jane.smith@example.org"));
        assert!(is_valid_email("  a+b@mail.co.uk "));
    }

    #[test]
    fn rejects_malformed_email() {
        assert!(!is_valid_email("jane"));
        assert!(!is_valid_email("jane@localhost"));
        assert!(!is_valid_email("ja ne@example.org"));
        assert!(!is_valid_email("a@@b.com"));
    }

    #[test]
    fn optional_email_allows_blank() {
        assert!(validate_optional_email("email", None).is_ok());
        assert!(validate_optional_email("email", Some("  ")).is_ok());
        assert!(validate_optional_email("email", Some("nope")).is_err());
    }

    #[test]
    fn name_must_not_be_blank() {
        assert!(validate_name("Full name", "   ").is_err());
        assert!(validate_name("Full name", "Jo").is_ok());
        assert!(validate_name("Full name", &"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn phone_characters() {
        assert!(validate_optional_phone(Some("+44 (0)20 7946-0000")).is_ok());
        assert!(validate_optional_phone(Some("call me")).is_err());
        assert!(validate_optional_phone(None).is_ok());
    }

    #[test]
    fn negative_amounts_rejected() {
        assert!(validate_non_negative("Day rate", Some(-1)).is_err());
        assert!(validate_non_negative("Day rate", Some(0)).is_ok());
    }
}
