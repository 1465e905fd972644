//! Who may do what to a task.
//!
//! Every rule here runs after `AuthMiddleware` has accepted the request and is a pure
//! function of the caller's `AuthContext` (plus, for updates, the owner read from the
//! store for this request). Update is an ownership rule and delete is a role rule.

use crate::auth::AuthContext;
use crate::error::AppError;
use crate::models::{Role, TaskScope};

/// Only technicians record tasks. The new task is always owned by the caller.
pub fn authorize_create(ctx: &AuthContext) -> Result<i64, AppError> {
    match ctx.role() {
        Some(Role::Technician) => Ok(ctx.user_id),
        _ => Err(AppError::Forbidden("Only technicians can create tasks".into())),
    }
}

/// Only the owning technician may update a task, whatever the caller's role.
pub fn authorize_update(ctx: &AuthContext, owner_id: i64) -> Result<(), AppError> {
    if ctx.user_id == owner_id {
        Ok(())
    } else {
        Err(AppError::Forbidden("Unauthorized to modify this task".into()))
    }
}

/// Only managers delete tasks, regardless of who owns them.
pub fn authorize_delete(ctx: &AuthContext) -> Result<(), AppError> {
    match ctx.role() {
        Some(Role::Manager) => Ok(()),
        _ => Err(AppError::Forbidden("Only managers can delete tasks".into())),
    }
}

/// Technicians list their own tasks, managers list everything.
pub fn list_scope(ctx: &AuthContext) -> Result<TaskScope, AppError> {
    match ctx.role() {
        Some(Role::Technician) => Ok(TaskScope::Technician(ctx.user_id)),
        Some(Role::Manager) => Ok(TaskScope::All),
        None => Err(AppError::Forbidden("Unauthorized role".into())),
    }
}
