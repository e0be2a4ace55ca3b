//! Authentication and user directory endpoints.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;

use super::{done, success, ApiResult};
use crate::auth::{self, AuthUser};
use crate::errors::AppError;
use crate::models::{SetRoleRequest, User};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub user: User,
}

/// POST /api/auth/verify - Verify the bearer token and record the sign-in.
pub async fn verify_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<VerifyResponse>, AppError> {
    let claims = auth::verify_request(&state, &headers).await?;
    let mut user = state.repo.upsert_user_from_claims(&claims).await?;
    if claims.admin == Some(true) {
        user.custom_claims.admin = true;
    }

    tracing::debug!(uid = %user.uid, "User verified");
    Ok(Json(VerifyResponse {
        success: true,
        user,
    }))
}

/// GET /api/auth/users - List users (admin).
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    success(state.repo.list_users().await?)
}

/// POST /api/auth/admin/set-role - Grant or revoke the admin role (admin).
pub async fn set_admin_role(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<SetRoleRequest>,
) -> ApiResult<()> {
    if request.uid.trim().is_empty() {
        return Err(AppError::Validation("uid is required".to_string()));
    }

    state.repo.set_admin(&request.uid, request.is_admin).await?;
    tracing::info!(by = %caller.uid, uid = %request.uid, admin = request.is_admin, "Admin role changed");

    if request.is_admin {
        done("Admin role granted successfully")
    } else {
        done("Admin role revoked successfully")
    }
}

/// DELETE /api/auth/users/{uid} - Delete a user record (admin).
pub async fn delete_user(State(state): State<AppState>, Path(uid): Path<String>) -> ApiResult<()> {
    state.repo.delete_user(&uid).await?;
    done("User deleted successfully")
}
