//! Endpoints for any signed-in user. Mutations are limited to tasks the caller executes.

use crate::{
    auth::{Identity, RequirePermission},
    error::AppError,
    models::TaskStatus,
    services::{Access, TaskService},
};
use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub executor_id: i64,
    pub status: TaskStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommentQuery {
    pub executor_id: i64,
    pub comment: String,
}

/// Returns the caller's subject and permissions.
#[get("/user", wrap = "RequirePermission::authenticated()")]
pub async fn whoami(identity: Identity) -> impl Responder {
    HttpResponse::Ok().json(identity)
}

/// Changes the status of a task the caller executes.
///
/// ## Query Parameters:
/// - `executorId`: must be the caller's own user id.
/// - `status`: `NEW`, `IN_PROGRESS` or `DONE`.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `403 Forbidden`: `executorId` is not the caller.
/// - `404 Not Found`: unknown task.
#[post("/{task_id}/status", wrap = "RequirePermission::authenticated()")]
pub async fn change_status(
    tasks: web::Data<TaskService>,
    identity: Identity,
    task_id: web::Path<i64>,
    query: web::Query<StatusChange>,
) -> Result<impl Responder, AppError> {
    let task = tasks
        .update_status(
            task_id.into_inner(),
            query.executor_id,
            query.status,
            Access::Executor(&identity),
        )
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Comments on a task the caller executes and returns the updated task.
#[post("/{task_id}/comments", wrap = "RequirePermission::authenticated()")]
pub async fn add_comment(
    tasks: web::Data<TaskService>,
    identity: Identity,
    task_id: web::Path<i64>,
    query: web::Query<NewCommentQuery>,
) -> Result<impl Responder, AppError> {
    let task = tasks
        .add_comment(
            task_id.into_inner(),
            query.executor_id,
            &query.comment,
            Access::Executor(&identity),
        )
        .await?;
    Ok(HttpResponse::Ok().json(task))
}
