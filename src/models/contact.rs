//! Contact form and newsletter models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A contact form submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub fn default_status() -> String {
    "new".to_string()
}

/// A newsletter subscriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSubscriber {
    pub email: String,
    #[serde(default)]
    pub subscribed_at: Option<String>,
    #[serde(default)]
    pub active: bool,
}

/// Request body for POST /api/contact/newsletter.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub email: String,
}
