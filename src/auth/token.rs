use crate::auth::permission::PermissionSet;
use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Represents the claims encoded within an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's email.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Role-derived permissions. Tokens without this claim are rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

/// The verified content of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject: String,
    pub permissions: PermissionSet,
}

/// Signs and verifies HS256 access tokens with a server-held secret.
///
/// Time is always passed in by the caller, so verification does not depend on the
/// wall clock.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Mints a token for `subject` that expires `ttl` after `now`.
    ///
    /// # Returns
    /// The compact JWT string, or `AppError::InternalServerError` if encoding fails.
    pub fn issue(
        &self,
        subject: &str,
        permissions: &PermissionSet,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            AppError::InternalServerError("Failed to generate token: expiry out of range".into())
        })?;
        let claims = Claims {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            permissions: Some(permissions.to_claim()),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token's signature, expiration and permissions claim.
    ///
    /// # Returns
    /// `AppError::InvalidToken` if the token is malformed, signed with another secret,
    /// expired at `now`, or has no `permissions` claim.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<VerifiedToken, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiration is checked below against the injected clock.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::InvalidToken(format!("Invalid token: {}", e)))?
            .claims;

        if claims.exp <= now.timestamp() {
            return Err(AppError::InvalidToken("Invalid token: ExpiredSignature".into()));
        }

        let permissions = claims
            .permissions
            .ok_or_else(|| AppError::InvalidToken("Invalid token: missing permissions claim".into()))?;

        Ok(VerifiedToken {
            subject: claims.sub,
            permissions: PermissionSet::from_claim(permissions.as_slice()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::permission::Permission;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn admin() -> PermissionSet {
        [Permission::Admin].into_iter().collect()
    }

    #[test]
    fn test_token_generation_and_verification() {
        let codec = TokenCodec::new("test_secret_for_gen_verify");
        let token = codec
            .issue("a@x.com", &admin(), start(), Duration::hours(1))
            .unwrap();

        let verified = codec.verify(&token, start() + Duration::minutes(59)).unwrap();
        assert_eq!(verified.subject, "a@x.com");
        assert_eq!(verified.permissions, admin());
    }

    #[test]
    fn test_issue_with_unrepresentable_expiry() {
        let codec = TokenCodec::new("test_secret_for_overflow");
        match codec.issue("a@x.com", &admin(), start(), Duration::MAX) {
            Err(AppError::InternalServerError(msg)) => assert!(msg.contains("expiry out of range")),
            other => panic!("expected an error for an overflowing expiry, got {:?}", other),
        }
    }

    #[test]
    fn test_token_expiration() {
        let codec = TokenCodec::new("test_secret_for_expiration");
        let token = codec
            .issue("a@x.com", &admin(), start(), Duration::hours(1))
            .unwrap();

        match codec.verify(&token, start() + Duration::hours(1)) {
            Err(AppError::InvalidToken(msg)) => assert!(msg.contains("ExpiredSignature")),
            other => panic!("Token should have been invalid due to expiration: {:?}", other),
        }
        assert!(codec.verify(&token, start() + Duration::days(3)).is_err());
    }

    #[test]
    fn test_invalid_token_signature() {
        let issuer = TokenCodec::new("secret_one");
        let verifier = TokenCodec::new("a_completely_different_secret");
        let token = issuer
            .issue("a@x.com", &admin(), start(), Duration::hours(1))
            .unwrap();

        match verifier.verify(&token, start()) {
            Err(AppError::InvalidToken(msg)) => assert!(msg.contains("InvalidSignature")),
            other => panic!("Token should have been invalid due to signature mismatch: {:?}", other),
        }
    }

    #[test]
    fn test_missing_permissions_claim_is_rejected() {
        let secret = "test_secret_for_claims";
        let claims = Claims {
            sub: "a@x.com".into(),
            exp: (start() + Duration::hours(1)).timestamp(),
            iat: start().timestamp(),
            permissions: None,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        match TokenCodec::new(secret).verify(&token, start()) {
            Err(AppError::InvalidToken(msg)) => assert!(msg.contains("permissions")),
            other => panic!("Token without permissions should be rejected: {:?}", other),
        }
    }

    #[test]
    fn test_garbage_and_tampered_tokens_are_rejected() {
        let codec = TokenCodec::new("test_secret_for_tamper");
        assert!(codec.verify("not-a-jwt", start()).is_err());

        let token = codec
            .issue("a@x.com", &PermissionSet::new(), start(), Duration::hours(1))
            .unwrap();
        let other = codec
            .issue("b@x.com", &admin(), start(), Duration::hours(1))
            .unwrap();
        let forged_payload = other.split('.').nth(1).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = forged_payload;
        assert!(codec.verify(&parts.join("."), start()).is_err());
    }
}
