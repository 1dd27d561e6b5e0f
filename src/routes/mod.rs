pub mod admin;
pub mod auth;
pub mod health;
pub mod tasks;
pub mod user;

use actix_web::web;

/// Routes under `/api/v1.0`. The caller wraps the scope with `AuthMiddleware`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login)
        .service(auth::register)
        .service(admin::find_all_tasks)
        .service(admin::find_all_users)
        .service(admin::add_task)
        .service(admin::delete_task)
        .service(admin::update_task_priority)
        .service(admin::update_task)
        .service(admin::update_task_status)
        .service(admin::assign_executor)
        .service(admin::add_comment_to_task)
        .service(
            web::scope("/tasks")
                .service(tasks::by_author)
                .service(tasks::by_executor)
                .service(tasks::by_title),
        )
        .service(user::whoami)
        .service(user::change_status)
        .service(user::add_comment);
}
