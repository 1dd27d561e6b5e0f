use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use serde::Serialize;
use std::future::{ready, Ready};

use crate::auth::permission::{Permission, PermissionSet};
use crate::auth::token::VerifiedToken;
use crate::error::AppError;

/// The authenticated caller of the current request.
///
/// `AuthMiddleware` inserts it into request extensions after a bearer token verifies.
/// Handlers take it as an extractor and pass it explicitly to services that need to
/// know who is acting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// The user's email.
    pub subject: String,
    pub permissions: PermissionSet,
}

impl Identity {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(permission)
    }

    pub fn has_any_permission(&self, permissions: &[Permission]) -> bool {
        self.permissions.contains_any(permissions)
    }
}

impl From<VerifiedToken> for Identity {
    fn from(token: VerifiedToken) -> Self {
        Self {
            subject: token.subject,
            permissions: token.permissions,
        }
    }
}

/// Extracts the identity established by `AuthMiddleware`.
///
/// Fails with `AppError::Forbidden` when the request carried no valid token.
impl FromRequest for Identity {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Identity>().cloned() {
            Some(identity) => ready(Ok(identity)),
            None => ready(Err(AppError::Forbidden("Access Denied".into()).into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::Payload;
    use actix_web::http::StatusCode;
    use actix_web::test;

    fn user_identity() -> Identity {
        Identity {
            subject: "a@x.com".into(),
            permissions: [Permission::User].into_iter().collect(),
        }
    }

    #[actix_rt::test]
    async fn test_identity_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(user_identity());

        let mut payload = Payload::None;
        let extracted = Identity::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(extracted, user_identity());
        assert!(extracted.has_permission(Permission::User));
        assert!(!extracted.has_permission(Permission::Admin));
    }

    #[actix_rt::test]
    async fn test_identity_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let err = Identity::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::FORBIDDEN);
    }
}
