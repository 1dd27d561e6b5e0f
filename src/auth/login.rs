use crate::auth::password::verify_password_off_thread;
use crate::auth::token::TokenCodec;
use crate::auth::{AuthResponse, LoginRequest};
use crate::clock::Clock;
use crate::error::AppError;
use crate::store::UserRepository;
use chrono::Duration;
use std::sync::Arc;

/// Message returned for every failed login, whether the email or the password was wrong.
pub const BAD_CREDENTIALS: &str = "Bad credentials";

/// Verifies login credentials against the credential store and issues access tokens.
pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    codec: Arc<TokenCodec>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl Authenticator {
    pub fn new(
        users: Arc<dyn UserRepository>,
        codec: Arc<TokenCodec>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            users,
            codec,
            clock,
            ttl,
        }
    }

    /// Reads `{email, password}` from a raw request body.
    ///
    /// A body that does not parse is logged and yields empty credentials, which then
    /// fail authentication like any other wrong login.
    pub fn parse_credentials(body: &[u8]) -> LoginRequest {
        match serde_json::from_slice::<LoginRequest>(body) {
            Ok(credentials) => credentials,
            Err(e) => {
                log::error!("Invalid login request: {}", e);
                LoginRequest::default()
            }
        }
    }

    /// Checks the credentials and, on success, mints a token carrying the user's role.
    pub async fn authenticate(&self, credentials: &LoginRequest) -> Result<AuthResponse, AppError> {
        let user = match self.users.find_by_email(&credentials.email).await? {
            Some(user) => user,
            None => {
                log::warn!("Login failed for unknown email '{}'", credentials.email);
                return Err(AppError::InvalidCredentials(BAD_CREDENTIALS.into()));
            }
        };

        let matches = verify_password_off_thread(credentials.password.clone(), user.password_hash.clone())
            .await
            .unwrap_or_else(|e| {
                log::warn!("Stored password hash for {} is unusable: {}", user.email, e);
                false
            });
        if !matches {
            log::warn!("Login failed for {}: wrong password", user.email);
            return Err(AppError::InvalidCredentials(BAD_CREDENTIALS.into()));
        }

        let access_token =
            self.codec
                .issue(&user.email, &user.role.permissions(), self.clock.now(), self.ttl)?;
        log::info!("User {} logged in", user.email);
        Ok(AuthResponse { access_token })
    }

    /// The full login flow over a raw body.
    pub async fn login(&self, body: &[u8]) -> Result<AuthResponse, AppError> {
        let credentials = Self::parse_credentials(body);
        self.authenticate(&credentials).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::auth::permission::Permission;
    use crate::clock::FixedClock;
    use crate::models::{NewUser, Role};
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};

    async fn authenticator() -> (Authenticator, Arc<TokenCodec>, Arc<FixedClock>) {
        let store = Arc::new(MemoryStore::new());
        store
            .insert(NewUser {
                email: "a@x.com".into(),
                password_hash: hash_password("pw", 4).unwrap(),
                role: Role::Admin,
            })
            .await
            .unwrap();
        let codec = Arc::new(TokenCodec::new("login-test-secret"));
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
        ));
        let auth = Authenticator::new(store, codec.clone(), clock.clone(), Duration::hours(1));
        (auth, codec, clock)
    }

    #[actix_rt::test]
    async fn test_login_issues_token_with_role_permissions() {
        let (auth, codec, clock) = authenticator().await;
        let response = auth
            .login(br#"{"email":"a@x.com","password":"pw"}"#)
            .await
            .unwrap();

        let verified = codec.verify(&response.access_token, clock.now()).unwrap();
        assert_eq!(verified.subject, "a@x.com");
        assert!(verified.permissions.contains(Permission::Admin));
        assert!(!verified.permissions.contains(Permission::User));
    }

    #[actix_rt::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let (auth, _, _) = authenticator().await;

        for body in [
            &br#"{"email":"a@x.com","password":"nope"}"#[..],
            &br#"{"email":"b@x.com","password":"pw"}"#[..],
        ] {
            match auth.login(body).await {
                Err(AppError::InvalidCredentials(msg)) => assert_eq!(msg, BAD_CREDENTIALS),
                other => panic!("expected bad credentials, got {:?}", other),
            }
        }
    }

    #[actix_rt::test]
    async fn test_malformed_body_is_a_failed_login() {
        let (auth, _, _) = authenticator().await;
        assert!(matches!(
            auth.login(b"{not json").await,
            Err(AppError::InvalidCredentials(_))
        ));
        assert_eq!(Authenticator::parse_credentials(b"").email, "");
    }
}
