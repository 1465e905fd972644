use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{Credentials, Role, Task, TaskListing, TaskScope, User};

const LIST_TECHNICIAN_TASKS: &str = "SELECT t.id, t.summary, t.performed_at, t.technician_id, u.username AS technician_name
     FROM tasks t
     JOIN users u ON t.technician_id = u.id
     WHERE t.technician_id = $1
     ORDER BY t.performed_at DESC";

const LIST_ALL_TASKS: &str = "SELECT t.id, t.summary, t.performed_at, t.technician_id, u.username AS technician_name
     FROM tasks t
     JOIN users u ON t.technician_id = u.id
     ORDER BY t.performed_at DESC";

/// Postgres-backed store. Every method is a single parameterized statement.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations under `migrations/`.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash, role)
             VALUES ($1, $2, $3)
             RETURNING id, username, role",
        )
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>, AppError> {
        let credentials = sqlx::query_as::<_, Credentials>(
            "SELECT id, password_hash, role FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credentials)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, task: &Task) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO tasks (id, technician_id, summary, performed_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(task.id)
        .bind(task.technician_id)
        .bind(&task.summary)
        .bind(task.performed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn task_owner(&self, id: Uuid) -> Result<Option<i64>, AppError> {
        let owner = sqlx::query_as::<_, (i64,)>("SELECT technician_id FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(owner.map(|(technician_id,)| technician_id))
    }

    async fn update_task(
        &self,
        id: Uuid,
        technician_id: i64,
        summary: &str,
        performed_at: Option<DateTime<Utc>>,
    ) -> Result<u64, AppError> {
        // Owner is re-checked here; a concurrent change of owner yields 0 rows.
        let result = sqlx::query(
            "UPDATE tasks
             SET summary = $1, performed_at = COALESCE($2, performed_at)
             WHERE id = $3 AND technician_id = $4",
        )
        .bind(summary)
        .bind(performed_at)
        .bind(id)
        .bind(technician_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_task(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn list_tasks(&self, scope: TaskScope) -> Result<Vec<TaskListing>, AppError> {
        let tasks = match scope {
            TaskScope::Technician(technician_id) => {
                sqlx::query_as::<_, TaskListing>(LIST_TECHNICIAN_TASKS)
                    .bind(technician_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            TaskScope::All => {
                sqlx::query_as::<_, TaskListing>(LIST_ALL_TASKS)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(tasks)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
