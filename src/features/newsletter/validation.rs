use regex::Regex;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern should compile")
});

pub const EMPTY_EMAIL_MESSAGE: &str = "Please enter your email address";
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address";

/// Checks the shape of a raw email and returns the trimmed address.
///
/// # Errors
///
/// Returns the inline message to show when the address is empty or malformed.
pub fn validate_email(raw: &str) -> Result<String, &'static str> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(EMPTY_EMAIL_MESSAGE);
    }
    if !EMAIL_PATTERN.is_match(email) {
        return Err(INVALID_EMAIL_MESSAGE);
    }
    Ok(email.to_string())
}
