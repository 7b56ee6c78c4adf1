use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::FromRequestParts, http::request::Parts, RequestPartsExt};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use model::entities::user;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::error::ApiError;
use crate::schemas::AppState;

pub const ROLE_USER: &str = "USER";
pub const ROLE_ADMIN: &str = "ADMIN";

/// Claims carried by every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the username.
    pub sub: String,
    /// Role names granted to the subject.
    pub roles: Vec<String>,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

/// Issues and verifies signed, expiring bearer tokens.
///
/// The symmetric signing key and token lifetime are injected at
/// construction from the runtime configuration; nothing here reads
/// process globals.
#[derive(Clone)]
pub struct TokenService {
    inner: Arc<TokenServiceInner>,
}

struct TokenServiceInner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_minutes: i64,
}

impl TokenService {
    pub fn new(secret: &str, token_minutes: i64) -> Self {
        let mut validation = Validation::default();
        // Expiry boundaries must be exact, not fuzzy.
        validation.leeway = 0;

        Self {
            inner: Arc::new(TokenServiceInner {
                encoding_key: EncodingKey::from_secret(secret.as_bytes()),
                decoding_key: DecodingKey::from_secret(secret.as_bytes()),
                validation,
                token_minutes,
            }),
        }
    }

    /// Sign a fresh token for the given subject and role set.
    pub fn issue(&self, username: &str, roles: Vec<String>) -> Result<String, ApiError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: username.to_string(),
            roles,
            iat: now,
            exp: now + self.inner.token_minutes * 60,
        };

        encode(&Header::default(), &claims, &self.inner.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verification fails closed: a bad signature, malformed token or
    /// past expiry all reject the caller as unauthenticated.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.inner.decoding_key, &self.inner.validation)
            .map(|data| data.claims)
            .map_err(|_| ApiError::Authentication("Invalid or expired token".to_string()))
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("token_minutes", &self.inner.token_minutes)
            .finish()
    }
}

/// Hash a password into PHC string format with a per-password salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {e}")))
}

/// Constant-time verification against a stored PHC hash. An unparsable
/// stored hash counts as a mismatch.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// The authenticated caller, resolved from the bearer token and the
/// credential store.
#[derive(Debug)]
pub struct CurrentUser {
    pub user: user::Model,
    pub roles: Vec<String>,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| ApiError::Authentication("Missing bearer token".to_string()))?;

        let claims = state.tokens.verify(bearer.token())?;

        let user_model = user::Entity::find()
            .filter(user::Column::Username.eq(&claims.sub))
            .one(&state.db)
            .await?
            .ok_or_else(|| {
                warn!("Token subject no longer exists: {}", claims.sub);
                ApiError::Authentication("Unknown token subject".to_string())
            })?;

        Ok(CurrentUser {
            user: user_model,
            roles: claims.roles,
        })
    }
}

/// An authenticated caller holding the ADMIN role.
#[derive(Debug)]
pub struct AdminUser(pub CurrentUser);

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        if !current.roles.iter().any(|role| role == ROLE_ADMIN) {
            return Err(ApiError::Forbidden);
        }
        Ok(AdminUser(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-signing-secret";

    fn raw_token(claims: &Claims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn issued_token_roundtrips() {
        let service = TokenService::new(SECRET, 60);
        let token = service
            .issue("alice@example.com", vec![ROLE_USER.to_string()])
            .unwrap();

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.roles, vec![ROLE_USER.to_string()]);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_valid_just_before_expiry() {
        let service = TokenService::new(SECRET, 60);
        let now = Utc::now().timestamp();
        let token = raw_token(&Claims {
            sub: "alice@example.com".to_string(),
            roles: vec![],
            iat: now - 3600,
            // Still a few seconds of lifetime left.
            exp: now + 5,
        });

        assert!(service.verify(&token).is_ok());
    }

    #[test]
    fn token_rejected_after_expiry() {
        let service = TokenService::new(SECRET, 60);
        let now = Utc::now().timestamp();
        let token = raw_token(&Claims {
            sub: "alice@example.com".to_string(),
            roles: vec![],
            iat: now - 3600,
            exp: now - 5,
        });

        assert!(service.verify(&token).is_err());
    }

    #[test]
    fn token_with_wrong_key_rejected() {
        let service = TokenService::new(SECRET, 60);
        let other = TokenService::new("a-different-secret", 60);
        let token = other.issue("mallory@example.com", vec![]).unwrap();

        assert!(service.verify(&token).is_err());
    }

    #[test]
    fn garbage_token_rejected() {
        let service = TokenService::new(SECRET, 60);
        assert!(service.verify("not.a.token").is_err());
        assert!(service.verify("").is_err());
    }

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("hunter2secret").unwrap();
        assert!(verify_password("hunter2secret", &hash));
        assert!(!verify_password("hunter2wrong", &hash));
        assert!(!verify_password("hunter2secret", "not-a-phc-hash"));
    }
}
