//! Persistence seams for users and tasks.
//!
//! Handlers only see these traits (through `web::Data<dyn UserStore>` and
//! `web::Data<dyn TaskStore>`). `PgStore` is the production adapter; `MemoryStore`
//! keeps the same semantics in process for tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Credentials, Role, Task, TaskListing, TaskScope, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Credential store: usernames, bcrypt hashes and roles.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user. A taken username is `AppError::BadRequest`.
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, AppError>;

    async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>, AppError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, task: &Task) -> Result<(), AppError>;

    /// Current owner of a task, read fresh on every call.
    async fn task_owner(&self, id: Uuid) -> Result<Option<i64>, AppError>;

    /// Updates the task only if it is still owned by `technician_id`, in one atomic
    /// statement. Returns the number of rows changed (0 or 1). A `None` `performed_at`
    /// keeps the stored value.
    async fn update_task(
        &self,
        id: Uuid,
        technician_id: i64,
        summary: &str,
        performed_at: Option<DateTime<Utc>>,
    ) -> Result<u64, AppError>;

    /// Returns the number of rows deleted (0 or 1).
    async fn delete_task(&self, id: Uuid) -> Result<u64, AppError>;

    /// Tasks visible in `scope`, most recently performed first.
    async fn list_tasks(&self, scope: TaskScope) -> Result<Vec<TaskListing>, AppError>;

    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), AppError>;
}
