use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::dto::RegisterDto;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\p{L}\p{M} '\-]+$").unwrap());

static COMPANY_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^[\p{L}\p{M}\p{N}\p{Zs}.&'"\-(),/]+$"#).unwrap());

static LOCALE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}([-_][A-Z]{2})?$").unwrap());

// The HTML5 email pattern browsers apply to <input type="email">. Matching
// it server-side keeps both sides agreeing on what a valid address is.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .unwrap()
});

/// Validation messages keyed by form field name, in stable field order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// First message for a field, or the empty string. Templates rely on
    /// this never panicking.
    pub fn first(&self, field: &str) -> &str {
        self.errors
            .get(field)
            .and_then(|msgs| msgs.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn all(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Field-level validation of the normalized DTO. Uniqueness and denylist
/// checks need the database and are layered on by the caller.
pub fn validate(dto: &RegisterDto, password_confirmation: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();

    check_name(&mut errors, "first_name", &dto.first_name);
    check_name(&mut errors, "last_name", &dto.last_name);

    if dto.company_name.is_empty() {
        errors.add("company_name", "This field is required.");
    } else if dto.company_name.chars().count() > 150 {
        errors.add("company_name", "Must not exceed 150 characters.");
    } else if !COMPANY_NAME_RE.is_match(&dto.company_name) {
        errors.add("company_name", "Contains characters that are not allowed.");
    }

    // Email failures are collected, not bailed, so a too-long invalid
    // address reports both problems at once.
    if dto.email.is_empty() {
        errors.add("email", "This field is required.");
    } else {
        if dto.email.chars().count() > 128 {
            errors.add("email", "Must not exceed 128 characters.");
        }
        if !EMAIL_RE.is_match(&dto.email) {
            errors.add("email", "Enter a valid email address.");
        }
    }

    check_password(&mut errors, &dto.password, password_confirmation);

    if password_confirmation.is_empty() {
        errors.add("password_confirmation", "This field is required.");
    }

    if !dto.accept_privacy {
        errors.add("accept_privacy", "You must accept the privacy policy.");
    }

    if let Some(tz) = &dto.timezone {
        if tz.chars().count() > 64 {
            errors.add("time_zone", "Must not exceed 64 characters.");
        } else if tz.parse::<chrono_tz::Tz>().is_err() {
            errors.add("time_zone", "Unknown time zone.");
        }
    }

    if let Some(locale) = &dto.locale {
        if locale.chars().count() > 10 {
            errors.add("locale", "Must not exceed 10 characters.");
        } else if !LOCALE_RE.is_match(locale) {
            errors.add("locale", "Invalid locale format.");
        }
    }

    errors
}

/// The `website` field is never shown to humans; any content means a bot.
pub fn honeypot_tripped(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn check_name(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.is_empty() {
        errors.add(field, "This field is required.");
    } else if value.chars().count() > 100 {
        errors.add(field, "Must not exceed 100 characters.");
    } else if !NAME_RE.is_match(value) {
        errors.add(
            field,
            "Only letters, spaces, apostrophes and hyphens are allowed.",
        );
    }
}

// Required, then confirmation, then strength; each stage only runs when the
// previous one passed. Strength failures are reported together.
fn check_password(errors: &mut FieldErrors, password: &str, confirmation: &str) {
    if password.is_empty() {
        errors.add("password", "This field is required.");
        return;
    }

    if password != confirmation {
        errors.add("password", "The password confirmation does not match.");
        return;
    }

    let count = password.chars().count();
    if count < 8 {
        errors.add("password", "Must be at least 8 characters.");
    }
    if count > 64 {
        errors.add("password", "Must not exceed 64 characters.");
    }
    if !(password.chars().any(char::is_uppercase) && password.chars().any(char::is_lowercase)) {
        errors.add("password", "Must contain upper and lower case letters.");
    }
    if !password.chars().any(char::is_numeric) {
        errors.add("password", "Must contain at least one number.");
    }
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        errors.add("password", "Must contain at least one symbol.");
    }
}
