use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::auth::session;
use crate::error::AppError;
use crate::models::UserRole;
use crate::state::SharedState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(cookie) = jar.get(session::SESSION_COOKIE) else {
            return Err(AppError::Unauthorized("Missing session".to_string()));
        };

        let claims = session::decode_token(cookie.value(), &state.config.jwt_secret)
            .map_err(|_| AppError::Unauthorized("Invalid or expired session".to_string()))?;

        let role = claims
            .role
            .parse::<UserRole>()
            .map_err(|_| AppError::Unauthorized("Invalid session claims".to_string()))?;

        Ok(AuthUser {
            user_id: claims.sub,
            role,
        })
    }
}
