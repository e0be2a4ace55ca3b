//! Promotional offer model.

use serde::{Deserialize, Serialize};

use super::lenient;

/// A promotional offer shown on the home page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Percentage discount
    #[serde(default, deserialize_with = "lenient::opt_integer")]
    pub discount: Option<i64>,
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_till: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Request body for POST /api/offers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfferRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::opt_integer")]
    pub discount: Option<i64>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub valid_till: Option<String>,
}

impl From<CreateOfferRequest> for Offer {
    fn from(request: CreateOfferRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            discount: request.discount,
            code: request.code.unwrap_or_default(),
            valid_till: request.valid_till,
            active: true,
        }
    }
}
