//! Wires stores, services and the authentication stack into an actix `ServiceConfig`.

use actix_web::web;
use chrono::Duration;
use std::sync::Arc;

use crate::auth::{AuthMiddleware, Authenticator, TokenCodec};
use crate::clock::Clock;
use crate::config::Config;
use crate::routes::{self, health};
use crate::services::{CommentService, TaskService, UserService};
use crate::store::Repositories;

/// Everything a worker needs to serve requests. Cheap to clone; one copy per worker.
#[derive(Clone)]
pub struct AppContext {
    users: web::Data<UserService>,
    tasks: web::Data<TaskService>,
    authenticator: web::Data<Authenticator>,
    codec: Arc<TokenCodec>,
    clock: Arc<dyn Clock>,
}

impl AppContext {
    pub fn new(repos: Repositories, config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self::with_settings(
            repos,
            &config.jwt_secret,
            config.access_token_ttl,
            config.bcrypt_cost,
            clock,
        )
    }

    pub fn with_settings(
        repos: Repositories,
        jwt_secret: &str,
        access_token_ttl: Duration,
        bcrypt_cost: u32,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let codec = Arc::new(TokenCodec::new(jwt_secret));
        let comments = CommentService::new(repos.comments.clone(), repos.tasks.clone());

        Self {
            users: web::Data::new(UserService::new(repos.users.clone(), bcrypt_cost)),
            tasks: web::Data::new(TaskService::new(repos.tasks, repos.users.clone(), comments)),
            authenticator: web::Data::new(Authenticator::new(
                repos.users,
                codec.clone(),
                clock.clone(),
                access_token_ttl,
            )),
            codec,
            clock,
        }
    }

    pub fn auth_middleware(&self) -> AuthMiddleware {
        AuthMiddleware::new(self.codec.clone(), self.clock.clone())
    }

    /// Registers shared state, `/health` and the `/api/v1.0` scope behind the
    /// request authorization middleware.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.users.clone())
            .app_data(self.tasks.clone())
            .app_data(self.authenticator.clone())
            .service(health::health)
            .service(
                web::scope("/api/v1.0")
                    .wrap(self.auth_middleware())
                    .configure(routes::config),
            );
    }
}
