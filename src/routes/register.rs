use std::net::SocketAddr;

use askama::Template;
use axum::extract::{ConnectInfo, Form, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use serde_json::json;

use crate::auth::session::{self, Claims};
use crate::error::AppError;
use crate::events::RegistrationEvent;
use crate::flash::{self, FlashPayload, OldInput};
use crate::middleware::audit;
use crate::pii::mask_email;
use crate::rate_limit;
use crate::registration::dto::{RegisterDto, RegisterForm};
use crate::registration::rules::{self, FieldErrors};
use crate::registration::service::{self, RegisterError};
use crate::settings::SettingsStore;
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "register.html")]
struct RegisterTemplate {
    errors: FieldErrors,
    old: OldInput,
    register_failed: bool,
    captcha_enabled: bool,
}

#[derive(Template)]
#[template(path = "verify_email.html")]
struct VerifyNoticeTemplate {}

pub async fn index_redirect() -> Redirect {
    Redirect::to("/register")
}

pub async fn register_page(State(state): State<SharedState>, jar: CookieJar) -> Response {
    // Already signed in: straight to onboarding.
    if let Some(cookie) = jar.get(session::SESSION_COOKIE) {
        if session::decode_token(cookie.value(), &state.config.jwt_secret).is_ok() {
            return Redirect::to("/onboarding").into_response();
        }
    }

    let flash_payload = jar
        .get(flash::FLASH_COOKIE)
        .and_then(|c| flash::decode(c.value()));
    let had_flash = flash_payload.is_some();
    let flash_payload = flash_payload.unwrap_or_default();

    let mut settings = SettingsStore::new(state.pool.clone());
    let captcha_enabled = settings.get_bool("security.captcha.enabled", true).await;

    let template = RegisterTemplate {
        register_failed: flash_payload.status.as_deref() == Some("register_failed"),
        errors: flash_payload.errors,
        old: flash_payload.old,
        captcha_enabled,
    };
    let body = Html(template.render().unwrap_or_default());

    // Flash is one-shot: clear it along with the render that consumed it.
    if had_flash {
        (CookieJar::new().add(flash::clear_cookie()), body).into_response()
    } else {
        body.into_response()
    }
}

pub async fn verify_notice_page() -> impl IntoResponse {
    let template = VerifyNoticeTemplate {};
    Html(template.render().unwrap_or_default())
}

pub async fn store(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let mut settings = SettingsStore::new(state.pool.clone());

    // Throttle by client IP before doing any other work.
    let limit = settings
        .get_int("security.signup.throttle_per_ip", 5)
        .await as u32;
    let ip = rate_limit::client_ip(&headers, Some(addr.ip()), &state.config.trusted_proxies);
    if let Err(retry_after) = state.signup_limiter.check(ip, limit) {
        tracing::warn!("Signup throttled for {ip}, retry in {retry_after}s");
        return Err(AppError::RateLimited(
            "Too many signup attempts. Please try again later.".to_string(),
        ));
    }

    // Bots that fill the hidden field get the success redirect and nothing
    // else; no row is created, no error is revealed.
    let honeypot_enabled = settings
        .get_bool("security.signup.honeypot.enabled", true)
        .await;
    if honeypot_enabled && rules::honeypot_tripped(form.website.as_deref()) {
        tracing::info!("Honeypot tripped from {ip}");
        let verify_first = settings.get_bool("auth.verify_first", true).await;
        return Ok(Redirect::to(post_register_target(verify_first)).into_response());
    }

    let dto = RegisterDto::from_form(&form);
    let mut errors = rules::validate(&dto, &form.password_confirmation);

    // Denylist and uniqueness only once the address itself is well-formed.
    if !errors.has("email") {
        let denylisted = settings
            .get_bool("security.email.disposable_denylist.enabled", true)
            .await
            && {
                let domains = settings
                    .get_array("security.email.disposable_denylist.domains")
                    .await;
                email_domain_in(&dto.email, &domains)
            };

        if denylisted {
            errors.add("email", "Disposable email addresses are not allowed.");
        } else if crate::db::users::email_exists(&state.pool, &dto.email).await? {
            errors.add("email", "This email is already taken.");
        }
    }

    if !errors.is_empty() {
        return Ok(flash_back(errors, &form, None));
    }

    // A concurrent signup can still take the email between the check above
    // and the insert; the unique index reports it as EmailTaken.
    let (user, company) = match service::create(&state.pool, &mut settings, &dto).await {
        Ok(pair) => pair,
        Err(RegisterError::EmailTaken) => {
            tracing::warn!("Signup lost duplicate-email race");
            let mut errors = FieldErrors::new();
            errors.add("email", "This email is already taken.");
            return Ok(flash_back(errors, &form, None));
        }
        Err(err) => {
            tracing::error!("Signup failed: {err}");
            return Ok(flash_back(
                FieldErrors::new(),
                &form,
                Some("register_failed"),
            ));
        }
    };

    audit::log_event(
        &state.pool,
        Some(user.id),
        "user.registered",
        "user",
        Some(user.id),
        Some(json!({
            "email": mask_email(&user.email),
            "company_id": company.id,
            "accept_privacy": dto.accept_privacy,
        })),
    )
    .await;

    // The account exists either way, so a session failure here is loud.
    let claims = Claims::new(user.id, user.role);
    let token = session::encode_token(&claims, &state.config.jwt_secret).map_err(|e| {
        tracing::error!("Session issue failed after registration for user {}: {e}", user.id);
        AppError::Internal(e)
    })?;

    state.events.emit(RegistrationEvent {
        user_id: user.id,
        company_id: company.id,
    });

    tracing::info!("User created: {}", user.id);

    let verify_first = settings.get_bool("auth.verify_first", true).await;
    let jar = CookieJar::new()
        .add(session::session_cookie(&token))
        .add(flash::clear_cookie());
    Ok((jar, Redirect::to(post_register_target(verify_first))).into_response())
}

fn post_register_target(verify_first: bool) -> &'static str {
    if verify_first {
        "/register/verify"
    } else {
        "/onboarding"
    }
}

fn flash_back(errors: FieldErrors, form: &RegisterForm, status: Option<&str>) -> Response {
    let payload = FlashPayload {
        errors,
        old: OldInput::from_form(form),
        status: status.map(str::to_string),
    };
    let jar = CookieJar::new().add(flash::set_cookie(&payload));
    (jar, Redirect::to("/register")).into_response()
}

fn email_domain_in(email: &str, domains: &[String]) -> bool {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    domains.iter().any(|d| d.eq_ignore_ascii_case(domain))
}
