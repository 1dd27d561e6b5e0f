#![allow(dead_code)]

use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::header,
    test,
};
use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;
use taskhub::auth::{hash_password, AuthResponse};
use taskhub::clock::FixedClock;
use taskhub::models::{NewUser, Role, User};
use taskhub::store::{MemoryStore, Repositories, UserRepository};
use taskhub::AppContext;

pub const SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "Password123!";

/// A context over a fresh in-memory store and a clock frozen at a known instant.
pub struct Harness {
    pub context: AppContext,
    pub repos: Repositories,
    pub clock: Arc<FixedClock>,
}

impl Harness {
    pub fn new() -> Self {
        let repos = Repositories::memory(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        ));
        let context = AppContext::with_settings(
            repos.clone(),
            SECRET,
            Duration::hours(1),
            4,
            clock.clone(),
        );
        Self {
            context,
            repos,
            clock,
        }
    }

    /// Inserts a user directly into the store, bypassing registration.
    pub async fn seed_user(&self, email: &str, role: Role) -> User {
        self.repos
            .users
            .insert(NewUser {
                email: email.into(),
                password_hash: hash_password(PASSWORD, 4).unwrap(),
                role,
            })
            .await
            .unwrap()
    }
}

/// Builds the test service the same way `main` configures each worker.
macro_rules! init_app {
    ($harness:expr) => {{
        let context = $harness.context.clone();
        actix_web::test::init_service(
            actix_web::App::new().configure(move |cfg| context.configure(cfg)),
        )
        .await
    }};
}

pub async fn login<S, B>(app: &S, email: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1.0/login")
        .set_json(json!({ "email": email, "password": PASSWORD }))
        .to_request();
    let response: AuthResponse = test::call_and_read_body_json(app, req).await;
    response.access_token
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

