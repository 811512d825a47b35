use crate::models::UserRole;

use super::dto::RegisterDto;

/// Field set for the `users` insert. Carries the plain password; hashing is
/// the service's job. No side effects here.
pub struct UserPayload {
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_plain: String,
    pub timezone: Option<String>,
    pub locale: Option<String>,
    pub accept_privacy: bool,
}

impl std::fmt::Debug for UserPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserPayload")
            .field("role", &self.role)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password_plain", &"<redacted>")
            .field("timezone", &self.timezone)
            .field("locale", &self.locale)
            .field("accept_privacy", &self.accept_privacy)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CompanyPayload {
    pub company_name: String,
}

/// Public sign-up always produces a COMPANY account.
pub fn to_user_payload(dto: &RegisterDto) -> UserPayload {
    UserPayload {
        role: UserRole::Company,
        first_name: dto.first_name.clone(),
        last_name: dto.last_name.clone(),
        email: dto.email.clone(),
        password_plain: dto.password.clone(),
        timezone: dto.timezone.clone(),
        locale: dto.locale.as_deref().map(normalize_locale),
        accept_privacy: dto.accept_privacy,
    }
}

/// Minimal draft payload; only the display name is known at signup.
pub fn to_company_payload(dto: &RegisterDto) -> CompanyPayload {
    CompanyPayload {
        company_name: truncate_chars(dto.company_name.trim(), 200),
    }
}

/// Hidden locale inputs arrive as either `pl-PL` or `pl_PL`; storage uses
/// the underscore form.
fn normalize_locale(locale: &str) -> String {
    locale.replace('-', "_")
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}
