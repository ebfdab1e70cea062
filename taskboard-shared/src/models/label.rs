/// Label model and database operations
///
/// Labels are tags attachable to many tasks through the `tasks_labels`
/// join table. A label that is still attached to a task cannot be deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Tag attachable to many tasks
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Label {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLabel {
    pub name: String,
}

impl Label {
    /// Creates a new label
    pub async fn create(pool: &PgPool, data: CreateLabel) -> Result<Self, sqlx::Error> {
        let label = sqlx::query_as::<_, Label>(
            r#"
            INSERT INTO labels (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .fetch_one(pool)
        .await?;

        Ok(label)
    }

    /// Finds a label by id
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let label = sqlx::query_as::<_, Label>(
            "SELECT id, name, created_at, updated_at FROM labels WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(label)
    }

    /// Finds a label by its exact name
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        let label = sqlx::query_as::<_, Label>(
            "SELECT id, name, created_at, updated_at FROM labels WHERE name = $1 LIMIT 1",
        )
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(label)
    }

    /// Lists all labels, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let labels = sqlx::query_as::<_, Label>(
            "SELECT id, name, created_at, updated_at FROM labels ORDER BY id",
        )
        .fetch_all(pool)
        .await?;

        Ok(labels)
    }

    /// Renames a label
    pub async fn update(pool: &PgPool, id: i64, name: String) -> Result<Option<Self>, sqlx::Error> {
        let label = sqlx::query_as::<_, Label>(
            r#"
            UPDATE labels
            SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(label)
    }

    /// Deletes a label unless any task still carries it
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the row was deleted, `Ok(false)` if join rows still
    /// reference it (or it doesn't exist)
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let referencing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tasks_labels WHERE label_id = $1")
                .bind(id)
                .fetch_one(pool)
                .await?;

        if referencing > 0 {
            return Ok(false);
        }

        let result = sqlx::query("DELETE FROM labels WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
