//! Tour package model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient::{self, CommaList, LineList};

/// A tour package. List fields accept arrays or delimited strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// e.g. "9D / 8N"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destinations: Option<String>,
    #[serde(default)]
    pub features: CommaList,
    #[serde(default)]
    pub itinerary: LineList,
    #[serde(default)]
    pub inclusions: CommaList,
    #[serde(default)]
    pub exclusions: CommaList,
    #[serde(default)]
    pub terms: LineList,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
