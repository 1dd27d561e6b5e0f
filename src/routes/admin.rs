//! Task and user administration. Every route here requires the ADMIN authority.

use crate::{
    auth::{Identity, RequirePermission},
    error::AppError,
    models::{TaskInput, TaskStatus, TaskUpdate, UserView},
    services::{Access, TaskService, UserService},
};
use actix_web::{get, post, put, web, HttpResponse, Responder};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PriorityQuery {
    pub priority: i32,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: TaskStatus,
}

/// Lists every task with author, executor and comments resolved.
#[get("/findAllTask", wrap = "RequirePermission::admin()")]
pub async fn find_all_tasks(tasks: web::Data<TaskService>) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(tasks.find_all().await?))
}

#[get("/findAllUser", wrap = "RequirePermission::admin()")]
pub async fn find_all_users(users: web::Data<UserService>) -> Result<impl Responder, AppError> {
    let users: Vec<UserView> = users.list().await?.iter().map(UserView::from).collect();
    Ok(HttpResponse::Ok().json(users))
}

/// Creates a new task.
///
/// ## Request Body:
/// A JSON object matching `TaskInput`: `title`, `description`, `priority`, `status`,
/// `authorId` and `executorId`. Both referenced users must exist.
///
/// ## Responses:
/// - `201 Created`: the created task.
/// - `400 Bad Request`: validation failed.
/// - `404 Not Found`: the author or executor does not exist.
#[post("/addTask", wrap = "RequirePermission::admin()")]
pub async fn add_task(
    tasks: web::Data<TaskService>,
    input: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = tasks.add_task(input.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

#[post("/delete/{task_id}", wrap = "RequirePermission::admin()")]
pub async fn delete_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    tasks.delete_task(task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Changes a task's priority.
///
/// Unlike the other admin updates this one still checks ownership: the caller must be
/// the user identified by `executor_id`.
#[put(
    "/updateTaskPriority/{task_id}/{executor_id}",
    wrap = "RequirePermission::admin()"
)]
pub async fn update_task_priority(
    tasks: web::Data<TaskService>,
    identity: Identity,
    path: web::Path<(i64, i64)>,
    query: web::Query<PriorityQuery>,
) -> Result<impl Responder, AppError> {
    let (task_id, executor_id) = path.into_inner();
    let task = tasks
        .update_priority(task_id, executor_id, query.priority, Access::Executor(&identity))
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

#[put("/updateTask/{task_id}", wrap = "RequirePermission::admin()")]
pub async fn update_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<i64>,
    update: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    let task = tasks
        .update_task(task_id.into_inner(), update.into_inner(), Access::Privileged)
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

#[put(
    "/updateTaskStatus/{task_id}/{executor_id}",
    wrap = "RequirePermission::admin()"
)]
pub async fn update_task_status(
    tasks: web::Data<TaskService>,
    path: web::Path<(i64, i64)>,
    query: web::Query<StatusQuery>,
) -> Result<impl Responder, AppError> {
    let (task_id, executor_id) = path.into_inner();
    let task = tasks
        .update_status(task_id, executor_id, query.status, Access::Privileged)
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Reassigns a task. The body is the new executor's id as a bare JSON number.
#[put("/assignExecutorToTask/{task_id}", wrap = "RequirePermission::admin()")]
pub async fn assign_executor(
    tasks: web::Data<TaskService>,
    task_id: web::Path<i64>,
    executor_id: web::Json<i64>,
) -> Result<impl Responder, AppError> {
    let task = tasks
        .assign_executor(task_id.into_inner(), executor_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Adds a comment on behalf of `executor_id`. The body is the comment text.
#[post(
    "/addCommentToTask/{task_id}/{executor_id}",
    wrap = "RequirePermission::admin()"
)]
pub async fn add_comment_to_task(
    tasks: web::Data<TaskService>,
    path: web::Path<(i64, i64)>,
    text: String,
) -> Result<impl Responder, AppError> {
    let (task_id, executor_id) = path.into_inner();
    let task = tasks
        .add_comment(task_id, executor_id, &text, Access::Privileged)
        .await?;
    Ok(HttpResponse::Ok().json(task))
}
