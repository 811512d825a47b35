use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::registration::dto::{parse_checkbox, RegisterForm};
use crate::registration::rules::FieldErrors;

pub const FLASH_COOKIE: &str = "flash";

/// One-shot state carried across the Post/Redirect/Get hop: validation
/// errors, the submitted input for repopulating the form and an optional
/// status marker. Passwords are never part of it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlashPayload {
    #[serde(default)]
    pub errors: FieldErrors,
    #[serde(default)]
    pub old: OldInput,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OldInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub accept_privacy: bool,
    #[serde(default)]
    pub time_zone: String,
    #[serde(default)]
    pub locale: String,
}

impl OldInput {
    /// Everything except the passwords, as submitted.
    pub fn from_form(form: &RegisterForm) -> Self {
        OldInput {
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            email: form.email.clone(),
            company_name: form.company_name.clone(),
            accept_privacy: parse_checkbox(form.accept_privacy.as_deref()),
            time_zone: form.time_zone.clone().unwrap_or_default(),
            locale: form.locale.clone().unwrap_or_default(),
        }
    }
}

pub fn set_cookie(payload: &FlashPayload) -> Cookie<'static> {
    let json = serde_json::to_vec(payload).unwrap_or_default();
    Cookie::build((FLASH_COOKIE, URL_SAFE_NO_PAD.encode(json)))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn clear_cookie() -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

/// Decode a flash cookie value. Anything that fails to parse is treated as
/// absent rather than an error.
pub fn decode(value: &str) -> Option<FlashPayload> {
    let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
    serde_json::from_slice(&bytes).ok()
}
