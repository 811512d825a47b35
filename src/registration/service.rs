use sqlx::PgPool;

use crate::auth::password;
use crate::db;
use crate::models::{Company, User};
use crate::pii::mask_email;
use crate::settings::SettingsStore;

use super::dto::RegisterDto;
use super::mapper;

#[derive(Debug)]
pub enum RegisterError {
    /// The email hit the unique index, either in the pre-check window or in
    /// a concurrent-insert race.
    EmailTaken,
    PasswordHash(String),
    Database(sqlx::Error),
}

impl std::fmt::Display for RegisterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegisterError::EmailTaken => write!(f, "email already registered"),
            RegisterError::PasswordHash(msg) => write!(f, "password hashing failed: {msg}"),
            RegisterError::Database(err) => write!(f, "database error: {err}"),
        }
    }
}

impl From<sqlx::Error> for RegisterError {
    fn from(err: sqlx::Error) -> Self {
        if is_email_taken(&err) {
            RegisterError::EmailTaken
        } else {
            RegisterError::Database(err)
        }
    }
}

fn is_email_taken(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => db_err
            .constraint()
            .map_or_else(|| db_err.message().contains("email"), |c| c.contains("email")),
        _ => false,
    }
}

/// Flags governing the post-signup flow, resolved fresh per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationPreview {
    pub verify_first: bool,
    pub captcha_enabled: bool,
    pub trial_deferred: bool,
    pub trial_days: i64,
}

/// No side effects; maps the DTO and reads the flags the signup flow would
/// use, for diagnostics and tests. Returns the mapped payload alongside the
/// flags so callers can inspect what `create` would insert.
pub async fn preview(
    settings: &mut SettingsStore,
    dto: &RegisterDto,
) -> (mapper::UserPayload, RegistrationPreview) {
    let payload = mapper::to_user_payload(dto);

    let preview = RegistrationPreview {
        verify_first: settings.get_bool("auth.verify_first", true).await,
        captcha_enabled: settings.get_bool("security.captcha.enabled", true).await,
        trial_deferred: settings
            .get_bool("trial.defer_until_profile_complete", true)
            .await,
        trial_days: settings.get_int("trial.duration_days", 14).await,
    };

    tracing::info!(
        "Registration preview for {} (role {}): verify_first={} captcha={}",
        mask_email(&payload.email),
        payload.role,
        preview.verify_first,
        preview.captcha_enabled,
    );

    (payload, preview)
}

/// Create the user and the linked company draft in one transaction.
///
/// The password is hashed before the transaction opens; the plain value is
/// dropped with the payload and never logged. Localization falls back to
/// the `defaults.*` settings when the form did not supply a value.
pub async fn create(
    pool: &PgPool,
    settings: &mut SettingsStore,
    dto: &RegisterDto,
) -> Result<(User, Company), RegisterError> {
    let user_payload = mapper::to_user_payload(dto);
    let company_payload = mapper::to_company_payload(dto);

    let password_hash =
        password::hash(&user_payload.password_plain).map_err(RegisterError::PasswordHash)?;

    // Defense in depth; the DTO already normalized this.
    let email = user_payload.email.trim().to_lowercase();

    let language = settings.get_string("defaults.language", "pl").await;
    let locale = match &user_payload.locale {
        Some(l) => l.clone(),
        None => settings.get_string("defaults.locale", "pl_PL").await,
    };
    let timezone = match &user_payload.timezone {
        Some(t) => t.clone(),
        None => settings.get_string("defaults.timezone", "Europe/Warsaw").await,
    };

    let mut tx = pool.begin().await?;

    let user = db::users::create(
        &mut *tx,
        user_payload.role,
        &user_payload.first_name,
        &user_payload.last_name,
        &email,
        &password_hash,
        &language,
        &locale,
        &timezone,
    )
    .await?;

    let company =
        db::companies::create_draft(&mut *tx, user.id, &company_payload.company_name).await?;

    tx.commit().await?;

    tracing::info!(
        "Registered user {} ({}, role {}, locale {}, tz {}) with company draft {}",
        user.id,
        mask_email(&user.email),
        user.role,
        user.locale,
        user.timezone,
        company.id,
    );

    Ok((user, company))
}
