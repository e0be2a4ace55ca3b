//! Bearer-token authentication and admin authorization.
//!
//! Missing tokens are rejected with 401, tokens that fail verification with
//! 403, and non-admin callers on admin routes with 403.

mod verifier;

pub use verifier::*;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::AppState;

/// Claims read from an ID token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// User id
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    /// Custom admin claim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
    pub exp: u64,
}

/// The authenticated caller, inserted into request extensions by the middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub admin: bool,
    pub claims: IdTokenClaims,
}

impl AuthUser {
    /// Whether the caller may act on a resource owned by `owner_uid`.
    pub fn can_access(&self, owner_uid: &str) -> bool {
        self.admin || self.uid == owner_uid
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Verify the bearer token of a request and return its claims.
pub async fn verify_request(state: &AppState, headers: &HeaderMap) -> Result<IdTokenClaims, AppError> {
    let token = bearer_token(headers)
        .ok_or_else(|| AppError::Unauthorized("No token provided".to_string()))?;

    state.verifier.verify(token).await.map_err(|e| match e {
        VerifyError::NotConfigured => {
            AppError::Unauthorized("Authentication is not configured".to_string())
        }
        VerifyError::Invalid(reason) => {
            tracing::debug!("Token verification failed: {}", reason);
            AppError::Forbidden("Invalid token".to_string())
        }
    })
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, AppError> {
    let claims = verify_request(state, headers).await?;
    let admin = claims.admin == Some(true) || state.repo.is_admin(&claims.sub).await?;

    Ok(AuthUser {
        uid: claims.sub.clone(),
        email: claims.email.clone(),
        admin,
        claims,
    })
}

/// Middleware for routes that need any signed-in user.
pub async fn require_user(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    match authenticate(&state, request.headers()).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Middleware for admin-only routes.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers()).await {
        Ok(user) if user.admin => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(user) => {
            tracing::warn!(uid = %user.uid, path = %request.uri().path(), "Admin access denied");
            AppError::Forbidden("Admin access required".to_string()).into_response()
        }
        Err(e) => e.into_response(),
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("No token provided".to_string()))
    }
}
