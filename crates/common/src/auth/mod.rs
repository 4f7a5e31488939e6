//! Authentication and authorization utilities
//!
//! Login/logout flows live outside this system; what lives here are the
//! primitives they need:
//! - argon2 password hashing
//! - opaque single-session tokens (one live token per user)
//! - password-reset token hashing
//! - the bearer-token request extractor and role gate

use crate::db::models::{Role, User};
use crate::db::Repository;
use crate::errors::{AppError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::FromRequestParts, http::request::Parts};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Prefix stamped on session tokens so logs can tell them apart from other
/// opaque strings
pub const SESSION_TOKEN_PREFIX: &str = "lx_";

/// Extracted authentication context available to handlers
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Bearer session token as presented by the client
    pub token: String,

    /// Request ID for tracing
    pub request_id: String,
}

impl AuthContext {
    /// Resolve this context to its user and enforce a minimum role.
    ///
    /// A token nobody holds means the session was superseded or logged out.
    pub async fn authorize(&self, repo: &Repository, min_role: Role) -> Result<User> {
        let user = repo
            .find_user_by_session_token(&self.token)
            .await?
            .ok_or(AppError::InvalidSessionToken)?;

        let role = user.user_role().ok_or_else(|| AppError::Internal {
            message: format!("user {} has unknown role {}", user.id, user.role),
        })?;

        if role < min_role {
            return Err(AppError::Forbidden {
                message: format!("requires at least the {} role", min_role.as_str()),
            });
        }

        Ok(user)
    }
}

/// Hash a password for storage
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal {
            message: format!("Failed to hash password: {}", e),
        })
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Generate a fresh opaque session token.
///
/// Storing it via `Repository::set_session_token` is what invalidates the
/// previous session; generation itself has no side effects.
pub fn generate_session_token() -> String {
    let random_bytes: [u8; 32] = rand::random();
    format!("{}{}", SESSION_TOKEN_PREFIX, hex::encode(random_bytes))
}

/// Hash a password-reset token for storage; only the hash is persisted
pub fn hash_reset_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Extract a bearer token from an Authorization header value
pub fn extract_bearer(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Axum extractor for AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let request_id = parts
            .headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized {
                message: "Missing Authorization header".to_string(),
            })?;

        let token = extract_bearer(auth_header)
            .ok_or_else(|| AppError::Unauthorized {
                message: "Authorization header is not a bearer token".to_string(),
            })?
            .to_string();

        if !token.starts_with(SESSION_TOKEN_PREFIX) {
            return Err(AppError::InvalidSessionToken);
        }

        Ok(AuthContext { token, request_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!verify_password("hunter2", "not-a-phc-string"));
    }

    #[test]
    fn test_generate_session_token() {
        let token = generate_session_token();
        assert!(token.starts_with(SESSION_TOKEN_PREFIX));
        assert!(token.len() > 40);
        assert_ne!(token, generate_session_token());
    }

    #[test]
    fn test_reset_token_hash_is_stable() {
        assert_eq!(hash_reset_token("abc"), hash_reset_token("abc"));
        assert_ne!(hash_reset_token("abc"), hash_reset_token("abd"));
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer lx_123"), Some("lx_123"));
        assert_eq!(extract_bearer("lx_123"), None);
        assert_eq!(extract_bearer("Basic abc"), None);
    }

    #[test]
    fn test_role_ordering() {
        assert!(Role::Lexicographer < Role::Editor);
        assert!(Role::Editor < Role::Admin);
        assert!(Role::Admin < Role::Superadmin);
    }
}
