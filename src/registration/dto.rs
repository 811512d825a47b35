use serde::Deserialize;

/// Raw registration POST body, exactly as the browser sent it. Missing
/// fields deserialize to their defaults so a partial submission still
/// reaches validation instead of failing extraction.
#[derive(Clone, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub accept_privacy: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    /// Honeypot. Rendered off-screen; humans leave it empty.
    #[serde(default)]
    pub website: Option<String>,
}

impl std::fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterForm")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("password_confirmation", &"<redacted>")
            .field("company_name", &self.company_name)
            .field("accept_privacy", &self.accept_privacy)
            .field("time_zone", &self.time_zone)
            .field("locale", &self.locale)
            .field("website", &self.website)
            .finish()
    }
}

/// Normalized view over the form. Built before validation so rules and the
/// service both see the same values.
#[derive(Clone)]
pub struct RegisterDto {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub company_name: String,
    pub accept_privacy: bool,
    pub timezone: Option<String>,
    pub locale: Option<String>,
}

impl RegisterDto {
    /// Names and company are trimmed, the email is trimmed and lowercased,
    /// consent is coerced to a strict bool and empty optionals are dropped.
    /// The password is carried verbatim.
    pub fn from_form(form: &RegisterForm) -> Self {
        RegisterDto {
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            email: form.email.trim().to_lowercase(),
            password: form.password.clone(),
            company_name: form.company_name.trim().to_string(),
            accept_privacy: parse_checkbox(form.accept_privacy.as_deref()),
            timezone: normalize_optional(form.time_zone.as_deref()),
            locale: normalize_optional(form.locale.as_deref()),
        }
    }
}

impl std::fmt::Debug for RegisterDto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterDto")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("company_name", &self.company_name)
            .field("accept_privacy", &self.accept_privacy)
            .field("timezone", &self.timezone)
            .field("locale", &self.locale)
            .finish()
    }
}

/// Strict truthy set for checkbox-style fields. Anything else is false.
pub fn parse_checkbox(value: Option<&str>) -> bool {
    match value {
        Some(v) => matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "on" | "yes"
        ),
        None => false,
    }
}

fn normalize_optional(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
