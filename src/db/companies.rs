use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Company;

/// Inserts the minimal INCOMPLETE draft created at registration. Everything
/// beyond the owner link and the display name is filled in later by the
/// profile completion flow.
pub async fn create_draft<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    company_name: &str,
) -> Result<Company, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        "INSERT INTO companies (user_id, company_name) VALUES ($1, $2) RETURNING *",
    )
    .bind(user_id)
    .bind(company_name)
    .fetch_one(executor)
    .await
}

pub async fn find_by_user_id(pool: &PgPool, user_id: Uuid) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        "SELECT * FROM companies WHERE user_id = $1 AND deleted_at IS NULL",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn count_all<'e, E: sqlx::PgExecutor<'e>>(executor: E) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM companies")
        .fetch_one(executor)
        .await?;
    Ok(row.0)
}
