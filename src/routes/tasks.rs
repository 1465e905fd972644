use crate::{
    auth::AuthContext,
    error::AppError,
    models::{Task, TaskInput},
    policy,
    store::TaskStore,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Lists the tasks visible to the caller.
///
/// Technicians see only their own tasks; managers see every task. Each row carries
/// the technician's username as `technician_name`. Ordered by `performed_at`,
/// most recent first.
///
/// ## Responses:
/// - `200 OK`: JSON array of tasks.
/// - `401 Unauthorized`: missing or invalid token.
/// - `403 Forbidden`: the token carries an unknown role.
/// - `500 Internal Server Error`: store failure.
#[get("")]
pub async fn list_tasks(
    tasks: web::Data<dyn TaskStore>,
    ctx: AuthContext,
) -> Result<impl Responder, AppError> {
    let scope = policy::list_scope(&ctx)?;
    let listing = tasks.list_tasks(scope).await?;

    Ok(HttpResponse::Ok().json(listing))
}

/// Records a task performed by the calling technician.
///
/// The task's `technician_id` is always the caller's id; a value in the body is ignored.
///
/// ## Request Body:
/// - `summary`: at most 2500 characters.
/// - `performed_at`: RFC 3339 timestamp, required and not the zero instant
///   `0001-01-01T00:00:00Z`.
///
/// ## Responses:
/// - `201 Created`: the stored task.
/// - `400 Bad Request`: malformed body, over-long summary, or missing `performed_at`.
/// - `401 Unauthorized`: missing or invalid token.
/// - `403 Forbidden`: caller is not a technician.
/// - `500 Internal Server Error`: store failure.
#[post("")]
pub async fn create_task(
    tasks: web::Data<dyn TaskStore>,
    ctx: AuthContext,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let technician_id = policy::authorize_create(&ctx)?;

    task_data.validate()?;
    let input = task_data.into_inner();
    let performed_at = input
        .performed_at_if_set()
        .ok_or_else(|| AppError::BadRequest("performed_at is required".into()))?;

    let task = Task::new(input.summary, performed_at, technician_id);
    tasks.insert_task(&task).await?;

    log::info!("technician {} recorded task {}", technician_id, task.id);
    Ok(HttpResponse::Created().json(task))
}

/// Updates a task owned by the caller.
///
/// The owner is read fresh from the store; only that technician may update, whatever
/// the caller's role. The write itself is conditional on id and owner, and a write
/// that matches nothing is reported as not found.
///
/// ## Path Parameters:
/// - `id`: The UUID of the task to update.
///
/// ## Responses:
/// - `200 OK`: `{message, id}`.
/// - `400 Bad Request`: malformed body or over-long summary.
/// - `401 Unauthorized`: missing or invalid token.
/// - `403 Forbidden`: caller does not own the task.
/// - `404 Not Found`: no such task, or it changed owner before the write.
/// - `500 Internal Server Error`: store failure.
#[put("/{id}")]
pub async fn update_task(
    tasks: web::Data<dyn TaskStore>,
    ctx: AuthContext,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();

    let owner_id = tasks
        .task_owner(task_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    policy::authorize_update(&ctx, owner_id)?;

    task_data.validate()?;

    let updated = tasks
        .update_task(
            task_id,
            ctx.user_id,
            &task_data.summary,
            task_data.performed_at,
        )
        .await?;
    if updated == 0 {
        return Err(AppError::NotFound("Task not found or unauthorized".into()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task updated successfully",
        "id": task_id,
    })))
}

/// Deletes any task. Managers only.
///
/// ## Path Parameters:
/// - `id`: The UUID of the task to delete.
///
/// ## Responses:
/// - `200 OK`: `{message, id}`.
/// - `401 Unauthorized`: missing or invalid token.
/// - `403 Forbidden`: caller is not a manager.
/// - `404 Not Found`: no such task.
/// - `500 Internal Server Error`: store failure.
#[delete("/{id}")]
pub async fn delete_task(
    tasks: web::Data<dyn TaskStore>,
    ctx: AuthContext,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    policy::authorize_delete(&ctx)?;
    let task_id = task_id.into_inner();

    if tasks.task_owner(task_id).await?.is_none() {
        return Err(AppError::NotFound("Task not found".into()));
    }
    if tasks.delete_task(task_id).await? == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    log::info!("manager {} deleted task {}", ctx.user_id, task_id);
    Ok(HttpResponse::Ok().json(json!({
        "message": "Task deleted successfully",
        "id": task_id,
    })))
}
