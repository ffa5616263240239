use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::models::{AuthenticatedUser, Claims};
use crate::error::AppError;

/// Issue an HS256 access token for `user`, valid for `ttl`.
pub fn issue_token(secret: &str, user: &AuthenticatedUser, ttl: Duration) -> Result<String, AppError> {
    let claims = Claims {
        sub: user.user_id.clone(),
        email: user.email.clone(),
        exp: (Utc::now() + ttl).timestamp(),
    };

    let header = Header::default(); // HS256
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, &claims, &key)
        .map_err(|e| AppError::Internal(format!("Failed to issue token: {e}")))
}

/// Verify a token's signature and expiry and return the user it names.
pub fn verify_token(secret: &str, token: &str) -> Result<AuthenticatedUser, AppError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default(); // HS256, exp required

    let data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        tracing::debug!("token validation failed: {e}");
        AppError::Auth("Invalid or expired token".into())
    })?;

    Ok(data.claims.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_then_verify() {
        let user = AuthenticatedUser {
            user_id: "user-42".to_string(),
            email: Some("writer@example.com".to_string()),
        };
        let token = issue_token("secret", &user, Duration::hours(1)).unwrap();

        // JWT has 3 parts separated by dots
        assert_eq!(token.split('.').count(), 3);

        let verified = verify_token("secret", &token).unwrap();
        assert_eq!(verified, user);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token =
            issue_token("secret", &AuthenticatedUser::new("u1"), Duration::hours(1)).unwrap();
        match verify_token("other-secret", &token) {
            Err(AppError::Auth(msg)) => assert!(msg.contains("Invalid or expired")),
            other => panic!("Expected Auth error, got: {:?}", other),
        }
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Past the default 60s leeway
        let token =
            issue_token("secret", &AuthenticatedUser::new("u1"), Duration::minutes(-10)).unwrap();
        assert!(verify_token("secret", &token).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(verify_token("secret", "not.a.jwt").is_err());
    }
}
