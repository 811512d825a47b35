pub mod onboarding;
pub mod register;

use axum::routing::get;
use axum::Router;

use crate::state::SharedState;

pub fn page_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(register::index_redirect))
        .route(
            "/register",
            get(register::register_page).post(register::store),
        )
        .route("/register/verify", get(register::verify_notice_page))
        .route("/onboarding", get(onboarding::index))
}
