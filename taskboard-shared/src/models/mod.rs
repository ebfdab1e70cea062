/// Database models for Taskboard
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts (creators and executors of tasks)
/// - `status`: Workflow statuses
/// - `label`: Labels, attachable to many tasks
/// - `task`: Tasks, their label associations, and the filter query
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::{CreateUser, User};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     first_name: "John".to_string(),
///     last_name: "Doe".to_string(),
///     email: "user@example.com".to_string(),
///     password_digest: "$argon2id$...".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod label;
pub mod status;
pub mod task;
pub mod user;
