use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the admin token check
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("No token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Admin only")]
    NotAdmin,
}

impl AuthError {
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken => 401,
            AuthError::NotAdmin => 403,
        }
    }
}

/// Claims carried by an admin bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
    pub exp: usize,
}

/// Verifies HS256 bearer tokens for the administrative routes
///
/// Tokens are issued elsewhere; this only checks signature, expiry and
/// the `isAdmin` claim.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Check an `Authorization` header value and require admin rights
    pub fn require_admin(&self, authorization: Option<&str>) -> Result<Claims, AuthError> {
        let header = authorization.ok_or(AuthError::MissingToken)?;
        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::InvalidToken)?;

        let claims = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Rejected admin token: {}", e);
                AuthError::InvalidToken
            })?
            .claims;

        if !claims.is_admin {
            return Err(AuthError::NotAdmin);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn token(is_admin: bool, exp_offset: i64) -> String {
        let claims = Claims {
            sub: Some("admin@example.com".to_string()),
            is_admin,
            exp: (chrono::Utc::now().timestamp() + exp_offset) as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    #[test]
    fn test_admin_token_accepted() {
        let verifier = TokenVerifier::new(SECRET);
        let header = format!("Bearer {}", token(true, 3600));

        let claims = verifier.require_admin(Some(&header)).unwrap();
        assert!(claims.is_admin);
    }

    #[test]
    fn test_missing_and_malformed_tokens() {
        let verifier = TokenVerifier::new(SECRET);

        assert_eq!(verifier.require_admin(None).unwrap_err(), AuthError::MissingToken);
        assert_eq!(
            verifier.require_admin(Some("Basic abc")).unwrap_err(),
            AuthError::InvalidToken
        );
        assert_eq!(
            verifier.require_admin(Some("Bearer not-a-jwt")).unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn test_non_admin_forbidden() {
        let verifier = TokenVerifier::new(SECRET);
        let header = format!("Bearer {}", token(false, 3600));

        let err = verifier.require_admin(Some(&header)).unwrap_err();
        assert_eq!(err, AuthError::NotAdmin);
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn test_wrong_secret_and_expired() {
        let verifier = TokenVerifier::new("other-secret");
        let header = format!("Bearer {}", token(true, 3600));
        assert_eq!(verifier.require_admin(Some(&header)).unwrap_err(), AuthError::InvalidToken);

        let verifier = TokenVerifier::new(SECRET);
        let header = format!("Bearer {}", token(true, -3600));
        assert_eq!(verifier.require_admin(Some(&header)).unwrap_err(), AuthError::InvalidToken);
    }
}
