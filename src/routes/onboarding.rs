use askama::Template;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::settings::SettingsStore;
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "onboarding.html")]
struct OnboardingTemplate {
    first_name: String,
    company_name: String,
    company_status: String,
    user_fields: Vec<String>,
    company_fields: Vec<String>,
}

pub async fn index(State(state): State<SharedState>, auth: AuthUser) -> Result<Response, AppError> {
    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unknown user".to_string()))?;

    let company = db::companies::find_by_user_id(&state.pool, user.id).await?;

    let mut settings = SettingsStore::new(state.pool.clone());
    let user_fields = settings.get_array("onboarding.required_fields.user").await;
    let company_fields = settings
        .get_array("onboarding.required_fields.company")
        .await;

    let template = OnboardingTemplate {
        first_name: user.first_name.clone(),
        company_name: company
            .as_ref()
            .map(|c| c.company_name.clone())
            .unwrap_or_default(),
        company_status: company
            .as_ref()
            .map(|c| c.status.to_string())
            .unwrap_or_default(),
        user_fields,
        company_fields,
    };

    Ok(Html(template.render().unwrap_or_default()).into_response())
}
