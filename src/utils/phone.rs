use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^62\d{8,13}$").expect("valid phone regex"))
}

/// Normalize an Indonesian phone number to the `62xxxxxxxxxx` form.
///
/// `0812…`, `+62 812…`, `62-812…` and `812…` all become `62812…`. Input that does not
/// look like a phone number is returned with only its separators stripped.
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if let Some(rest) = digits.strip_prefix('0') {
        format!("62{rest}")
    } else if digits.starts_with("62") {
        digits
    } else if digits.starts_with('8') {
        format!("62{digits}")
    } else {
        digits
    }
}

pub fn validate_phone(phone: &str) -> AppResult<()> {
    if !phone_regex().is_match(phone) {
        return Err(AppError::ValidationError(
            "Invalid phone number, expected an Indonesian number (08xx / +62xx)".to_string(),
        ));
    }

    Ok(())
}
