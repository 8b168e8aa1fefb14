use async_trait::async_trait;

use crate::db::Database;
use crate::progress::{ProgressStore, StoreError};

/// PostgreSQL-backed progress pointer.
///
/// The advance is a single conditional `UPDATE`; `rows_affected`
/// distinguishes a won compare-and-swap from a lost one (or an unknown
/// caller), so no read-then-write window exists.
pub struct PgProgressStore {
    db: Database,
}

impl PgProgressStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProgressStore for PgProgressStore {
    async fn current_step(&self, caller_id: &str) -> Result<Option<i32>, StoreError> {
        let row: Option<Option<i32>> =
            sqlx::query_scalar(r#"SELECT "progress" FROM "users" WHERE "id" = $1"#)
                .bind(caller_id)
                .fetch_optional(self.db.pool())
                .await?;
        Ok(row.flatten())
    }

    async fn advance_if_current(
        &self,
        caller_id: &str,
        expected_current: i32,
        next: i32,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"UPDATE "users" SET "progress" = $3 WHERE "id" = $1 AND "progress" = $2"#,
        )
        .bind(caller_id)
        .bind(expected_current)
        .bind(next)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn initialize(&self, caller_id: &str, first_step_id: i32) -> Result<(), StoreError> {
        sqlx::query(
            r#"UPDATE "users" SET "progress" = $2 WHERE "id" = $1 AND "progress" IS NULL"#,
        )
        .bind(caller_id)
        .bind(first_step_id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn reset(&self, caller_id: &str, first_step_id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query(r#"UPDATE "users" SET "progress" = $2 WHERE "id" = $1"#)
            .bind(caller_id)
            .bind(first_step_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
