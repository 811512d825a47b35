use sqlx::PgPool;

use crate::models::Setting;

pub async fn get<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    key: &str,
) -> Result<Option<Setting>, sqlx::Error> {
    sqlx::query_as::<_, Setting>("SELECT * FROM settings WHERE key = $1")
        .bind(key)
        .fetch_optional(executor)
        .await
}

pub async fn upsert(
    pool: &PgPool,
    key: &str,
    value: serde_json::Value,
    kind: &str,
) -> Result<Setting, sqlx::Error> {
    sqlx::query_as::<_, Setting>(
        "INSERT INTO settings (key, value, type) VALUES ($1, $2, $3)
         ON CONFLICT (key) DO UPDATE
         SET value = EXCLUDED.value, type = EXCLUDED.type, updated_at = now()
         RETURNING *",
    )
    .bind(key)
    .bind(value)
    .bind(kind)
    .fetch_one(pool)
    .await
}
