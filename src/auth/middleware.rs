use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, AUTHORIZATION},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::sync::Arc;

use crate::auth::extractors::Identity;
use crate::auth::token::TokenCodec;
use crate::clock::Clock;

/// Routes that never look at the Authorization header.
const PUBLIC_PATHS: &[&str] = &["/api/v1.0/login", "/api/v1.0/register"];

/// Establishes the request identity from a bearer token.
///
/// The middleware never rejects a request. A missing, malformed, expired or forged
/// token leaves the request without an `Identity`, and the decision point on the
/// endpoint turns that into a 403.
pub struct AuthMiddleware {
    codec: Arc<TokenCodec>,
    clock: Arc<dyn Clock>,
}

impl AuthMiddleware {
    pub fn new(codec: Arc<TokenCodec>, clock: Arc<dyn Clock>) -> Self {
        Self { codec, clock }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            codec: self.codec.clone(),
            clock: self.clock.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    codec: Arc<TokenCodec>,
    clock: Arc<dyn Clock>,
}

impl<S> AuthMiddlewareService<S> {
    fn identify(&self, headers: &HeaderMap) -> Option<Identity> {
        let token = bearer_token(headers)?;
        match self.codec.verify(token, self.clock.now()) {
            Ok(verified) => Some(Identity::from(verified)),
            Err(e) => {
                log::debug!("Ignoring bearer token: {}", e);
                None
            }
        }
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !PUBLIC_PATHS.contains(&req.path()) {
            if let Some(identity) = self.identify(req.headers()) {
                req.extensions_mut().insert(identity);
            }
        }

        Box::pin(self.service.call(req))
    }
}

/// Returns the token of an `Authorization: Bearer <token>` header, if there is one.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
