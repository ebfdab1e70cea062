/// Task model, label associations, and the filter query
///
/// This is the core of the data layer. Tasks reference a status and a
/// creator (both delete-restricted), optionally an executor, and carry any
/// number of labels through the `tasks_labels` join table.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     status_id BIGINT NOT NULL REFERENCES statuses (id) ON DELETE RESTRICT,
///     creator_id BIGINT NOT NULL REFERENCES users (id) ON DELETE RESTRICT,
///     executor_id BIGINT REFERENCES users (id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE tasks_labels (
///     task_id BIGINT NOT NULL REFERENCES tasks (id) ON DELETE CASCADE,
///     label_id BIGINT NOT NULL REFERENCES labels (id) ON DELETE RESTRICT,
///     PRIMARY KEY (task_id, label_id)
/// );
/// ```
///
/// # Filtering
///
/// [`TaskFilter`] predicates are independent and combine with AND. When a
/// label predicate is active the query left-joins `tasks_labels` and groups
/// by the joined primary keys, so a task carrying several labels still
/// appears once.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task::{Task, TaskFilter};
/// # use sqlx::PgPool;
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let filter = TaskFilter {
///     status_id: Some(1),
///     has_label: true,
///     ..Default::default()
/// };
///
/// for task in Task::list(&pool, &filter).await? {
///     println!("{}: {}", task.id, task.name);
/// }
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// A label attached to a task (id + name projection)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskLabel {
    pub id: i64,
    pub name: String,
}

/// A task with its joined display data and labels
///
/// `status_name` and the creator names come from inner-ish left joins on
/// NOT NULL foreign keys; the executor columns are genuinely nullable.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task id
    pub id: i64,

    /// Task name
    pub name: String,

    /// Free-form description
    pub description: Option<String>,

    /// Workflow status (delete-restricted reference)
    pub status_id: i64,

    /// User who opened the task (delete-restricted reference)
    pub creator_id: i64,

    /// User assigned to perform the task, if any
    pub executor_id: Option<i64>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,

    /// Name of the referenced status
    pub status_name: String,

    /// Creator given name
    pub creator_first_name: String,

    /// Creator family name
    pub creator_last_name: String,

    /// Executor given name, when an executor is assigned
    pub executor_first_name: Option<String>,

    /// Executor family name, when an executor is assigned
    pub executor_last_name: Option<String>,

    /// Labels attached to the task, loaded separately
    #[sqlx(skip)]
    pub labels: Vec<TaskLabel>,
}

impl Task {
    /// Ids of the attached labels
    pub fn label_ids(&self) -> Vec<i64> {
        self.labels.iter().map(|l| l.id).collect()
    }
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub name: String,
    pub description: Option<String>,
    pub status_id: i64,
    pub creator_id: i64,
    pub executor_id: Option<i64>,

    /// Labels to attach on creation
    pub label_ids: Vec<i64>,
}

/// Input for updating an existing task
///
/// Outer `None` leaves a field untouched; for the nullable columns the
/// inner option distinguishes "set" from "clear". `label_ids: Some(..)`
/// **replaces** the full association set; `None` leaves it alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub status_id: Option<i64>,
    pub executor_id: Option<Option<i64>>,

    /// Full replacement set of label ids
    pub label_ids: Option<Vec<i64>>,
}

/// Combinable task list predicates
///
/// Every predicate is independent; unset predicates don't constrain the
/// result. `has_label` is ignored when `label_id` is set, since a concrete
/// label match implies label presence.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Only tasks in this status
    pub status_id: Option<i64>,

    /// Only tasks assigned to this executor
    pub executor_id: Option<i64>,

    /// Only tasks opened by this creator ("only mine")
    pub creator_id: Option<i64>,

    /// Only tasks carrying this label
    pub label_id: Option<i64>,

    /// Only tasks carrying at least one label
    pub has_label: bool,
}

impl TaskFilter {
    fn needs_label_join(&self) -> bool {
        self.label_id.is_some() || self.has_label
    }
}

const TASK_SELECT: &str = r#"
SELECT tasks.id, tasks.name, tasks.description, tasks.status_id,
       tasks.creator_id, tasks.executor_id, tasks.created_at, tasks.updated_at,
       statuses.name AS status_name,
       creator.first_name AS creator_first_name,
       creator.last_name AS creator_last_name,
       executor.first_name AS executor_first_name,
       executor.last_name AS executor_last_name
FROM tasks
LEFT JOIN statuses ON tasks.status_id = statuses.id
LEFT JOIN users AS creator ON tasks.creator_id = creator.id
LEFT JOIN users AS executor ON tasks.executor_id = executor.id
"#;

impl Task {
    /// Creates a task together with its label associations
    ///
    /// The row insert and the join-table inserts run in one transaction, so
    /// a task never appears with half its labels.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO tasks (name, description, status_id, creator_id, executor_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.status_id)
        .bind(data.creator_id)
        .bind(data.executor_id)
        .fetch_one(&mut *tx)
        .await?;

        insert_label_rows(&mut tx, id, &data.label_ids).await?;

        tx.commit().await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Finds a task by id, with joined names and labels
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("{TASK_SELECT} WHERE tasks.id = $1");

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        let Some(mut task) = task else {
            return Ok(None);
        };

        let mut labels = load_labels(pool, &[id]).await?;
        task.labels = labels.remove(&id).unwrap_or_default();

        Ok(Some(task))
    }

    /// Lists tasks matching the filter
    ///
    /// Predicates are ANDed. The label predicates left-join `tasks_labels`
    /// and group by the joined primary keys so each matching task appears
    /// exactly once. Labels for the whole page are batch-loaded with a
    /// single `ANY($1)` query afterwards.
    pub async fn list(pool: &PgPool, filter: &TaskFilter) -> Result<Vec<Self>, sqlx::Error> {
        // Build the WHERE clause dynamically; all bound values are i64
        let mut sql = String::from(TASK_SELECT);
        let mut conditions: Vec<String> = Vec::new();
        let mut binds: Vec<i64> = Vec::new();

        if filter.needs_label_join() {
            sql.push_str("LEFT JOIN tasks_labels ON tasks.id = tasks_labels.task_id\n");
        }

        if let Some(status_id) = filter.status_id {
            binds.push(status_id);
            conditions.push(format!("tasks.status_id = ${}", binds.len()));
        }
        if let Some(executor_id) = filter.executor_id {
            binds.push(executor_id);
            conditions.push(format!("tasks.executor_id = ${}", binds.len()));
        }
        if let Some(creator_id) = filter.creator_id {
            binds.push(creator_id);
            conditions.push(format!("tasks.creator_id = ${}", binds.len()));
        }
        if let Some(label_id) = filter.label_id {
            binds.push(label_id);
            conditions.push(format!("tasks_labels.label_id = ${}", binds.len()));
        } else if filter.has_label {
            conditions.push("tasks_labels.label_id IS NOT NULL".to_string());
        }

        if !conditions.is_empty() {
            sql.push_str("WHERE ");
            sql.push_str(&conditions.join(" AND "));
            sql.push('\n');
        }

        if filter.needs_label_join() {
            // Deduplicate tasks that matched through several join rows
            sql.push_str("GROUP BY tasks.id, statuses.id, creator.id, executor.id\n");
        }

        sql.push_str("ORDER BY tasks.id");

        let mut query = sqlx::query_as::<_, Task>(&sql);
        for value in &binds {
            query = query.bind(*value);
        }

        let mut tasks = query.fetch_all(pool).await?;

        if tasks.is_empty() {
            return Ok(tasks);
        }

        let ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
        let mut labels = load_labels(pool, &ids).await?;
        for task in &mut tasks {
            task.labels = labels.remove(&task.id).unwrap_or_default();
        }

        Ok(tasks)
    }

    /// Updates a task; a supplied label list fully replaces the old one
    ///
    /// The scalar update and the delete-then-insert label replacement run
    /// in one transaction, so a crash mid-way can't strand a task with no
    /// (or mixed) associations.
    ///
    /// # Returns
    ///
    /// The updated task if found, None if the task doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status_id = ${}", bind_count));
        }
        if data.executor_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", executor_id = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1 RETURNING id");

        let mut q = sqlx::query_scalar::<_, i64>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status_id) = data.status_id {
            q = q.bind(status_id);
        }
        if let Some(executor_id) = data.executor_id {
            q = q.bind(executor_id);
        }

        let updated = q.fetch_optional(&mut *tx).await?;

        if updated.is_none() {
            return Ok(None);
        }

        if let Some(label_ids) = data.label_ids {
            // Full replacement, not a diff
            sqlx::query("DELETE FROM tasks_labels WHERE task_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            insert_label_rows(&mut tx, id, &label_ids).await?;
        }

        tx.commit().await?;

        Self::find_by_id(pool, id).await
    }

    /// Deletes a task; its label associations cascade away with it
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the row was deleted, `Ok(false)` if it didn't exist
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Inserts join rows for a task inside an open transaction
///
/// Duplicate ids in the input collapse onto the composite primary key.
async fn insert_label_rows(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    task_id: i64,
    label_ids: &[i64],
) -> Result<(), sqlx::Error> {
    for label_id in label_ids {
        sqlx::query(
            r#"
            INSERT INTO tasks_labels (task_id, label_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(task_id)
        .bind(label_id)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Batch-loads labels for a set of tasks in one query
async fn load_labels(
    pool: &PgPool,
    task_ids: &[i64],
) -> Result<HashMap<i64, Vec<TaskLabel>>, sqlx::Error> {
    let rows: Vec<(i64, i64, String)> = sqlx::query_as(
        r#"
        SELECT tasks_labels.task_id, labels.id, labels.name
        FROM tasks_labels
        JOIN labels ON tasks_labels.label_id = labels.id
        WHERE tasks_labels.task_id = ANY($1)
        ORDER BY labels.id
        "#,
    )
    .bind(task_ids)
    .fetch_all(pool)
    .await?;

    let mut by_task: HashMap<i64, Vec<TaskLabel>> = HashMap::new();
    for (task_id, id, name) in rows {
        by_task.entry(task_id).or_default().push(TaskLabel { id, name });
    }

    Ok(by_task)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_is_unconstrained() {
        let filter = TaskFilter::default();
        assert!(filter.status_id.is_none());
        assert!(filter.executor_id.is_none());
        assert!(filter.creator_id.is_none());
        assert!(filter.label_id.is_none());
        assert!(!filter.has_label);
        assert!(!filter.needs_label_join());
    }

    #[test]
    fn test_label_predicates_need_join() {
        let by_label = TaskFilter {
            label_id: Some(3),
            ..Default::default()
        };
        assert!(by_label.needs_label_join());

        let any_label = TaskFilter {
            has_label: true,
            ..Default::default()
        };
        assert!(any_label.needs_label_join());
    }
}
