use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{User, UserRole};

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    role: UserRole,
    first_name: &str,
    last_name: &str,
    email: &str,
    password_hash: &str,
    language: &str,
    locale: &str,
    timezone: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (role, first_name, last_name, email, password_hash, language, locale, timezone)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(role)
    .bind(first_name)
    .bind(last_name)
    .bind(email)
    .bind(password_hash)
    .bind(language)
    .bind(locale)
    .bind(timezone)
    .fetch_one(executor)
    .await
}

/// Case-insensitive, soft-deleted rows included. Matches the scope of the
/// `users_email_key` unique index.
pub async fn email_exists<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    email: &str,
) -> Result<bool, sqlx::Error> {
    let row: (bool,) =
        sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE lower(email) = lower($1))")
            .bind(email)
            .fetch_one(executor)
            .await?;
    Ok(row.0)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE lower(email) = lower($1) AND deleted_at IS NULL",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn count_all<'e, E: sqlx::PgExecutor<'e>>(executor: E) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(executor)
        .await?;
    Ok(row.0)
}
