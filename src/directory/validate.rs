//! Field validation for user records.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email pattern")
});

static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]{2,29}$").expect("valid username pattern"));

/// Checks `local@domain.tld`.
///
/// The local part allows `[A-Za-z0-9._%+-]`, the domain `[A-Za-z0-9.-]`, and
/// the top-level label must be at least two ASCII letters.
pub fn validate_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Starts with a letter, 3 to 30 characters of `[A-Za-z0-9_]`.
pub fn validate_username(username: &str) -> bool {
    USERNAME_REGEX.is_match(username)
}
