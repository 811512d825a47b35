use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::events::EventBus;
use crate::rate_limit::SignupRateLimiter;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub signup_limiter: SignupRateLimiter,
    pub events: EventBus,
}
