/// Status model and database operations
///
/// A status is the workflow state of a task ("new", "in progress", ...).
/// Statuses are reference data: any number of tasks point at one status,
/// and a status that is still referenced cannot be deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE statuses (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Workflow status of a task
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Status {
    /// Unique status id
    pub id: i64,

    /// Status name shown in listings and forms
    pub name: String,

    /// When the status was created
    pub created_at: DateTime<Utc>,

    /// When the status was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStatus {
    pub name: String,
}

impl Status {
    /// Creates a new status
    pub async fn create(pool: &PgPool, data: CreateStatus) -> Result<Self, sqlx::Error> {
        let status = sqlx::query_as::<_, Status>(
            r#"
            INSERT INTO statuses (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .fetch_one(pool)
        .await?;

        Ok(status)
    }

    /// Finds a status by id
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let status = sqlx::query_as::<_, Status>(
            "SELECT id, name, created_at, updated_at FROM statuses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(status)
    }

    /// Finds a status by its exact name
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        let status = sqlx::query_as::<_, Status>(
            "SELECT id, name, created_at, updated_at FROM statuses WHERE name = $1 LIMIT 1",
        )
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(status)
    }

    /// Lists all statuses, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let statuses = sqlx::query_as::<_, Status>(
            "SELECT id, name, created_at, updated_at FROM statuses ORDER BY id",
        )
        .fetch_all(pool)
        .await?;

        Ok(statuses)
    }

    /// Renames a status
    ///
    /// # Returns
    ///
    /// The updated status if found, None if the status doesn't exist
    pub async fn update(pool: &PgPool, id: i64, name: String) -> Result<Option<Self>, sqlx::Error> {
        let status = sqlx::query_as::<_, Status>(
            r#"
            UPDATE statuses
            SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(status)
    }

    /// Deletes a status unless any task still references it
    ///
    /// The reference check runs in application code on top of the
    /// `ON DELETE RESTRICT` action, so callers get a clean failure
    /// indicator instead of a constraint error.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the row was deleted, `Ok(false)` if tasks still point
    /// at it (or it doesn't exist)
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let referencing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE status_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;

        if referencing > 0 {
            return Ok(false);
        }

        let result = sqlx::query("DELETE FROM statuses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
