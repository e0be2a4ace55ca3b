//! Customer review model.

use serde::{Deserialize, Serialize};

use super::lenient;

/// A customer review, optionally about a specific car.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(default)]
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_integer")]
    pub rating: Option<i64>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub car_id: Option<String>,
    #[serde(default)]
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Request body for POST /api/reviews.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_integer")]
    pub rating: Option<i64>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub car_id: Option<String>,
}

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;
