//! Authentication and authorization.
//!
//! Single scheme for every role: argon2id password hashes, HS256 JWTs
//! carrying the user's role, and axum middleware that verifies the token
//! server-side. Role checks happen here too, so a route guarded with
//! [`AuthRouterExt::with_role`] cannot be reached by other roles.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::user;
use crate::errors::ErrorResponse;
use crate::models::Role;

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub phone: String,
    pub role: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
}

/// Authenticated user data extracted from a verified JWT
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: String,
    pub phone: String,
    pub role: Role,
}

impl AuthUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    pub fn is_management(&self) -> bool {
        self.role == Role::Management
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Insufficient permissions")]
    InsufficientPermissions,
    #[error("Token creation failed: {0}")]
    TokenCreation(String),
    #[error("Internal auth error: {0}")]
    Internal(String),
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingAuth | Self::InvalidToken | Self::TokenExpired => StatusCode::UNAUTHORIZED,
            Self::InsufficientPermissions => StatusCode::FORBIDDEN,
            Self::TokenCreation(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            Self::TokenCreation(_) | Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        };
        (status, Json(err)).into_response()
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_issuer: String,
        jwt_audience: String,
        token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            token_expiration,
        }
    }
}

/// Access token issued on successful login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Token issuance and validation.
#[derive(Clone, Debug)]
pub struct AuthService {
    pub config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Generate a JWT for an authenticated user.
    pub fn generate_token(&self, user: &user::Model) -> Result<TokenResponse, AuthError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.token_expiration)
                .map_err(|_| AuthError::TokenCreation("invalid token duration".to_string()))?;

        let claims = Claims {
            sub: user.id.to_string(),
            name: user.name.clone(),
            phone: user.phone.clone(),
            role: user.role.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.token_expiration.as_secs() as i64,
        })
    }

    /// Validate a JWT and extract its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        Ok(claims)
    }
}

/// Hash a password with argon2id and a fresh salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Internal(e.to_string()))
}

/// Verify a password against a stored argon2 hash. Malformed hashes verify
/// as false rather than erroring.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn auth_user_from_claims(claims: &Claims) -> Result<AuthUser, AuthError> {
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
    let role = Role::from_str(&claims.role).map_err(|_| AuthError::InvalidToken)?;
    Ok(AuthUser {
        user_id,
        name: claims.name.clone(),
        phone: claims.phone.clone(),
        role,
    })
}

async fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingAuth)?;

    if !auth_header.starts_with("Bearer ") {
        return Err(AuthError::MissingAuth);
    }

    let token = auth_header.trim_start_matches("Bearer ").trim();
    let claims = auth_service.validate_token(token)?;
    auth_user_from_claims(&claims)
}

/// Authentication middleware that extracts and validates bearer tokens.
/// Expects an `Arc<AuthService>` in the request extensions (inserted by an
/// outer layer in `main`).
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let headers = request.headers().clone();

    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service not available",
            )
                .into_response();
        }
    };

    match extract_auth_from_headers(&headers, &auth_service).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Role guard middleware, layered inside [`auth_middleware`].
pub async fn role_middleware(
    State(required_role): State<Role>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(AuthError::MissingAuth)?;

    if !user.has_role(required_role) {
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_role(self, role: Role) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_role(self, role: Role) -> Self {
        self.layer(axum::middleware::from_fn_with_state(role, role_middleware))
            .with_auth()
    }
}

/// Axum extractor so handlers can take `AuthUser` directly.
#[async_trait::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn test_service(expiration: Duration) -> AuthService {
        AuthService::new(AuthConfig::new(
            "unit_test_secret_key_that_is_long_enough".to_string(),
            "dairychain-api".to_string(),
            "dairychain-clients".to_string(),
            expiration,
        ))
    }

    fn test_user(role: Role) -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            name: "Mukamana Josiane".to_string(),
            phone: "+250788123456".to_string(),
            email: None,
            password_hash: String::new(),
            role: role.to_string(),
            site_id: None,
            active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn token_round_trip_preserves_identity() {
        let service = test_service(Duration::from_secs(3600));
        let user = test_user(Role::Diary);

        let token = service.generate_token(&user).unwrap();
        let claims = service.validate_token(&token.access_token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.role, "diary");
        let auth_user = auth_user_from_claims(&claims).unwrap();
        assert_eq!(auth_user.user_id, user.id);
        assert!(auth_user.has_role(Role::Diary));
        assert!(!auth_user.is_management());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = test_service(Duration::from_secs(3600));
        let other = AuthService::new(AuthConfig::new(
            "a_completely_different_secret_key_for_tests".to_string(),
            "dairychain-api".to_string(),
            "dairychain-clients".to_string(),
            Duration::from_secs(3600),
        ));

        let token = other.generate_token(&test_user(Role::Diary)).unwrap();
        assert_matches!(
            service.validate_token(&token.access_token),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("amata-meza-2024").unwrap();
        assert!(verify_password("amata-meza-2024", &hash));
        assert!(!verify_password("wrong-password", &hash));
        assert!(!verify_password("anything", "not-a-valid-hash"));
    }
}
