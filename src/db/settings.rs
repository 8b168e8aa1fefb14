use chrono::Utc;
use sqlx::Row;

use crate::db::Database;

/// Raw per-user language settings as stored on the `users` row. Columns
/// may be NULL for accounts created before the language fields existed;
/// defaulting happens in the settings service.
#[derive(Debug, Clone)]
pub struct SettingsRow {
    pub conversation_language: Option<String>,
    pub target_language: Option<String>,
    pub preferred_voice_id: Option<String>,
}

pub async fn get_settings_row(
    db: &Database,
    caller_id: &str,
) -> Result<Option<SettingsRow>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT "conversation_language", "target_language", "preferred_voice_id"
           FROM "users" WHERE "id" = $1"#,
    )
    .bind(caller_id)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.map(|r| SettingsRow {
        conversation_language: r
            .try_get::<Option<String>, _>("conversation_language")
            .ok()
            .flatten(),
        target_language: r.try_get::<Option<String>, _>("target_language").ok().flatten(),
        preferred_voice_id: r
            .try_get::<Option<String>, _>("preferred_voice_id")
            .ok()
            .flatten(),
    }))
}

pub async fn update_settings_row(
    db: &Database,
    caller_id: &str,
    conversation_language: &str,
    target_language: &str,
    preferred_voice_id: &str,
) -> Result<bool, sqlx::Error> {
    let now = Utc::now().naive_utc();
    let result = sqlx::query(
        r#"UPDATE "users"
           SET "conversation_language" = $2,
               "target_language" = $3,
               "preferred_voice_id" = $4,
               "updated_at" = $5
           WHERE "id" = $1"#,
    )
    .bind(caller_id)
    .bind(conversation_language)
    .bind(target_language)
    .bind(preferred_voice_id)
    .bind(now)
    .execute(db.pool())
    .await?;
    Ok(result.rows_affected() == 1)
}
