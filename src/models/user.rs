//! User directory model.

use serde::{Deserialize, Serialize};

/// Custom claims attached to a user; only `admin` is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomClaims {
    #[serde(default)]
    pub admin: bool,
}

/// A signed-in user as known to the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub email_verified: bool,
    pub disabled: bool,
    pub custom_claims: CustomClaims,
    pub metadata: UserMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMetadata {
    pub creation_time: String,
    pub last_sign_in_time: Option<String>,
}

/// Request body for POST /api/auth/admin/set-role.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRoleRequest {
    pub uid: String,
    pub is_admin: bool,
}
