//! Admin authentication: argon2 password verification and JWT session
//! tokens.
//!
//! The back-office has a single admin account (the owners); there is no
//! user table. The password hash lives in configuration, tokens are
//! short-lived JWTs sent as `Authorization: Bearer <token>`.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::SharedState;

// =============================================================================
// JWT
// =============================================================================

/// Claims carried by an admin token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, always "admin".
    pub sub: String,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Issues and validates admin JWTs.
#[derive(Clone)]
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl JwtManager {
    /// Creates a new JWT manager.
    pub fn new(secret: String, lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            lifetime_secs,
        }
    }

    /// Issues a fresh admin token.
    pub fn issue(&self) -> Result<String, ApiError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "admin".to_string(),
            iat: now,
            exp: now + self.lifetime_secs,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Token signing failed: {e}")))
    }

    /// Validates a token and returns its claims.
    pub fn validate(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| ApiError::unauthorized("Invalid or expired token"))
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn extract_bearer_token(header_value: &str) -> Option<&str> {
    header_value.strip_prefix("Bearer ").map(str::trim)
}

/// Axum middleware guarding the admin routes.
pub async fn admin_auth(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

    let token = extract_bearer_token(header_value)
        .ok_or_else(|| ApiError::unauthorized("Invalid authorization header"))?;

    state.jwt.validate(token)?;

    Ok(next.run(request).await)
}

// =============================================================================
// Passwords
// =============================================================================

/// Verifies a password against its argon2 hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Hashes a password for storage in configuration.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    Ok(argon2.hash_password(password.as_bytes(), &salt)?.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_roundtrip() {
        let jwt = JwtManager::new("test-secret".to_string(), 3600);
        let token = jwt.issue().unwrap();

        let claims = jwt.validate(&token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_jwt_rejects_wrong_secret() {
        let jwt = JwtManager::new("secret-a".to_string(), 3600);
        let token = jwt.issue().unwrap();

        let other = JwtManager::new("secret-b".to_string(), 3600);
        assert!(other.validate(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token(""), None);
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("olio-nuovo-2026").unwrap();
        assert!(verify_password("olio-nuovo-2026", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("olio-nuovo-2026", "not-a-hash"));
    }
}
