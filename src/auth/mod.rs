pub mod extractors;
pub mod guard;
pub mod login;
pub mod middleware;
pub mod password;
pub mod permission;
pub mod token;

use serde::{Deserialize, Serialize};

// Re-export necessary items
pub use extractors::Identity;
pub use guard::RequirePermission;
pub use login::Authenticator;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use permission::{Permission, PermissionSet};
pub use token::{Claims, TokenCodec, VerifiedToken};

/// Represents the payload for a login request.
///
/// Missing fields deserialize as empty strings so that an incomplete body fails
/// authentication instead of being rejected as a bad request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response body of a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The signed bearer token.
    pub access_token: String,
}
