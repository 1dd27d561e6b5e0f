use crate::{
    auth::Authenticator,
    error::AppError,
    models::{UserInput, UserView},
    services::UserService,
};
use actix_web::{post, web, HttpResponse, Responder};

/// Login user
///
/// Authenticates a user and returns an access token carrying the user's role.
/// The body is read raw: anything that is not `{email, password}` JSON is logged and
/// fails like a wrong password.
///
/// ## Responses:
/// - `200 OK`: `{"access_token": "..."}`.
/// - `403 Forbidden`: `{"error_message": "Bad credentials"}`.
#[post("/login")]
pub async fn login(
    authenticator: web::Data<Authenticator>,
    body: web::Bytes,
) -> Result<impl Responder, AppError> {
    let response = authenticator.login(&body).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Register a new user
///
/// Creates an account with the given role (`USER` when omitted) and returns it
/// without the password hash.
///
/// ## Responses:
/// - `200 OK`: the created user.
/// - `400 Bad Request`: invalid email or empty password.
/// - `409 Conflict`: the email is already registered.
#[post("/register")]
pub async fn register(
    users: web::Data<UserService>,
    input: web::Json<UserInput>,
) -> Result<impl Responder, AppError> {
    let user = users.register(input.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserView::from(&user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::{MemoryStore, Repositories};
    use crate::auth::TokenCodec;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use chrono::{Duration, Utc};
    use serde_json::json;
    use std::sync::Arc;

    fn services() -> (web::Data<UserService>, web::Data<Authenticator>) {
        let repos = Repositories::memory(MemoryStore::new());
        let users = web::Data::new(UserService::new(repos.users.clone(), 4));
        let authenticator = web::Data::new(Authenticator::new(
            repos.users,
            Arc::new(TokenCodec::new("routes-auth-secret")),
            Arc::new(FixedClock::new(Utc::now())),
            Duration::hours(1),
        ));
        (users, authenticator)
    }

    #[actix_rt::test]
    async fn test_register_validation() {
        let (users, authenticator) = services();
        let app = test::init_service(
            App::new()
                .app_data(users)
                .app_data(authenticator)
                .service(register),
        )
        .await;

        // Test invalid email
        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(json!({ "email": "invalid-email", "password": "pw" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        // Test empty password
        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(json!({ "email": "test@example.com", "password": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_register_then_login() {
        let (users, authenticator) = services();
        let app = test::init_service(
            App::new()
                .app_data(users)
                .app_data(authenticator)
                .service(register)
                .service(login),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(json!({ "email": "test@example.com", "password": "pw" }))
            .to_request();
        let created: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(created["email"], "test@example.com");
        assert_eq!(created["role"], "USER");
        assert!(created.get("password_hash").is_none());

        let req = test::TestRequest::post()
            .uri("/login")
            .set_payload(r#"{"email":"test@example.com","password":"pw"}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["access_token"].is_string());

        let req = test::TestRequest::post()
            .uri("/login")
            .set_payload("not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error_message": "Bad credentials" }));
    }
}
