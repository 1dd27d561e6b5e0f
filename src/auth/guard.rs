use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::extractors::Identity;
use crate::auth::permission::Permission;
use crate::error::AppError;

/// Per-endpoint permission check.
///
/// Wraps a single route and lets the request through only if the identity established
/// by `AuthMiddleware` holds at least one of the required permissions. Otherwise the
/// endpoint body never runs and the caller gets a 403.
///
/// ```ignore
/// #[get("/findAllTask", wrap = "RequirePermission::admin()")]
/// ```
#[derive(Debug, Clone)]
pub struct RequirePermission {
    any_of: Rc<[Permission]>,
}

impl RequirePermission {
    pub fn any_of(permissions: &[Permission]) -> Self {
        Self {
            any_of: Rc::from(permissions),
        }
    }

    /// Exactly the ADMIN authority.
    pub fn admin() -> Self {
        Self::any_of(&[Permission::Admin])
    }

    /// ADMIN or USER.
    pub fn authenticated() -> Self {
        Self::any_of(&[Permission::Admin, Permission::User])
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequirePermission
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequirePermissionService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequirePermissionService {
            service,
            any_of: self.any_of.clone(),
        }))
    }
}

pub struct RequirePermissionService<S> {
    service: S,
    any_of: Rc<[Permission]>,
}

impl<S, B> Service<ServiceRequest> for RequirePermissionService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let granted = match req.extensions().get::<Identity>() {
            Some(identity) if identity.has_any_permission(&self.any_of) => true,
            Some(identity) => {
                log::warn!(
                    "{} denied on {}: requires one of {:?}, has {:?}",
                    identity.subject,
                    req.path(),
                    self.any_of,
                    identity.permissions
                );
                false
            }
            None => {
                log::warn!("Anonymous request denied on {}", req.path());
                false
            }
        };

        if !granted {
            let response = AppError::Forbidden("Access Denied".into()).error_response();
            let denied = req.into_response(response).map_into_right_body();
            return Box::pin(async move { Ok(denied) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{get, test, App, HttpResponse};

    #[get("/admin", wrap = "RequirePermission::admin()")]
    async fn admin_only() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[get("/any", wrap = "RequirePermission::authenticated()")]
    async fn any_role() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    fn identity(permissions: &[Permission]) -> Identity {
        Identity {
            subject: "a@x.com".into(),
            permissions: permissions.iter().copied().collect(),
        }
    }

    async fn status(path: &str, identity: Option<Identity>) -> StatusCode {
        let app = test::init_service(
            App::new()
                .wrap_fn(move |req, srv| {
                    if let Some(identity) = identity.clone() {
                        req.extensions_mut().insert(identity);
                    }
                    srv.call(req)
                })
                .service(admin_only)
                .service(any_role),
        )
        .await;
        let req = test::TestRequest::get().uri(path).to_request();
        test::call_service(&app, req).await.status()
    }

    #[actix_rt::test]
    async fn test_admin_route() {
        assert_eq!(status("/admin", Some(identity(&[Permission::Admin]))).await, StatusCode::OK);
        assert_eq!(
            status("/admin", Some(identity(&[Permission::User]))).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(status("/admin", None).await, StatusCode::FORBIDDEN);
    }

    #[actix_rt::test]
    async fn test_any_role_route() {
        assert_eq!(status("/any", Some(identity(&[Permission::Admin]))).await, StatusCode::OK);
        assert_eq!(status("/any", Some(identity(&[Permission::User]))).await, StatusCode::OK);
        assert_eq!(status("/any", Some(identity(&[]))).await, StatusCode::FORBIDDEN);
        assert_eq!(status("/any", None).await, StatusCode::FORBIDDEN);
    }

    #[actix_rt::test]
    async fn test_denial_body() {
        let app = test::init_service(App::new().service(admin_only)).await;
        let req = test::TestRequest::get().uri("/admin").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, serde_json::json!({ "error": "Access Denied" }));
    }
}
