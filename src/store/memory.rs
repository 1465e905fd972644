use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{Credentials, Role, Task, TaskListing, TaskScope, User};

#[derive(Debug, Clone)]
struct UserRecord {
    id: i64,
    username: String,
    password_hash: String,
    role: Role,
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<UserRecord>,
    tasks: Vec<Task>,
}

/// In-process store with the same semantics as `PgStore`.
///
/// User ids are assigned sequentially from 1. Each method takes the lock once, so the
/// conditional update is as atomic as its SQL counterpart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == username) {
            return Err(AppError::BadRequest("Username already registered".into()));
        }

        let id = tables.users.len() as i64 + 1;
        tables.users.push(UserRecord {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role,
        });

        Ok(User {
            id,
            username: username.to_string(),
            role,
        })
    }

    async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| Credentials {
                id: u.id,
                password_hash: u.password_hash.clone(),
                role: u.role,
            }))
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, task: &Task) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == task.technician_id) {
            return Err(AppError::DatabaseError(format!(
                "technician {} does not exist",
                task.technician_id
            )));
        }
        tables.tasks.push(task.clone());
        Ok(())
    }

    async fn task_owner(&self, id: Uuid) -> Result<Option<i64>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.technician_id))
    }

    async fn update_task(
        &self,
        id: Uuid,
        technician_id: i64,
        summary: &str,
        performed_at: Option<DateTime<Utc>>,
    ) -> Result<u64, AppError> {
        let mut tables = self.tables.write().await;
        match tables
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.technician_id == technician_id)
        {
            Some(task) => {
                task.summary = summary.to_string();
                if let Some(performed_at) = performed_at {
                    task.performed_at = performed_at;
                }
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_task(&self, id: Uuid) -> Result<u64, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.tasks.len();
        tables.tasks.retain(|t| t.id != id);
        Ok((before - tables.tasks.len()) as u64)
    }

    async fn list_tasks(&self, scope: TaskScope) -> Result<Vec<TaskListing>, AppError> {
        let tables = self.tables.read().await;
        let mut listings: Vec<TaskListing> = tables
            .tasks
            .iter()
            .filter(|t| match scope {
                TaskScope::Technician(technician_id) => t.technician_id == technician_id,
                TaskScope::All => true,
            })
            .filter_map(|t| {
                // Inner join: a task whose technician vanished is not listed.
                let technician = tables.users.iter().find(|u| u.id == t.technician_id)?;
                Some(TaskListing {
                    id: t.id,
                    summary: t.summary.clone(),
                    performed_at: t.performed_at,
                    technician_id: t.technician_id,
                    technician_name: technician.username.clone(),
                })
            })
            .collect();

        listings.sort_by(|a, b| b.performed_at.cmp(&a.performed_at));
        Ok(listings)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
