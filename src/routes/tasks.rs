use crate::{
    auth::RequirePermission,
    error::AppError,
    models::{AuthorQuery, ExecutorQuery, PageRequest, TitleQuery},
    services::TaskService,
};
use actix_web::{get, web, HttpResponse, Responder};
use validator::Validate;

/// Retrieves a page of tasks written by one author.
///
/// ## Query Parameters:
/// - `authorId`: the author's user id.
/// - `page` (optional): zero-based page index, default 0.
/// - `size` (optional): page size between 1 and 1000, default 10.
///
/// ## Responses:
/// - `200 OK`: `{content, page, size, total_elements, total_pages}`, ordered by task id.
/// - `400 Bad Request`: `size` out of range.
/// - `403 Forbidden`: no valid token.
#[get("/author", wrap = "RequirePermission::authenticated()")]
pub async fn by_author(
    tasks: web::Data<TaskService>,
    query: web::Query<AuthorQuery>,
) -> Result<impl Responder, AppError> {
    query.validate()?;
    let page = tasks
        .find_by_author(query.author_id, PageRequest::new(query.page, query.size))
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Retrieves a page of tasks assigned to one executor. Same paging as `/author`.
#[get("/executor", wrap = "RequirePermission::authenticated()")]
pub async fn by_executor(
    tasks: web::Data<TaskService>,
    query: web::Query<ExecutorQuery>,
) -> Result<impl Responder, AppError> {
    query.validate()?;
    let page = tasks
        .find_by_executor(query.executor_id, PageRequest::new(query.page, query.size))
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Retrieves a page of tasks whose title contains `title` (case-sensitive).
#[get("/title", wrap = "RequirePermission::authenticated()")]
pub async fn by_title(
    tasks: web::Data<TaskService>,
    query: web::Query<TitleQuery>,
) -> Result<impl Responder, AppError> {
    query.validate()?;
    let page = tasks
        .find_by_title(&query.title, PageRequest::new(query.page, query.size))
        .await?;
    Ok(HttpResponse::Ok().json(page))
}
