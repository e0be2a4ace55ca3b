//! Flight and train search models.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::lenient;

/// Request body for POST /api/flights/search.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchRequest {
    /// IATA code
    #[serde(default)]
    pub from: String,
    /// IATA code
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub depart_date: String,
    #[serde(default)]
    pub return_date: Option<String>,
    /// Number or numeric string
    #[serde(default, deserialize_with = "lenient::opt_integer")]
    pub adults: Option<i64>,
    #[serde(default)]
    pub trip_type: TripType,
}

impl FlightSearchRequest {
    /// Passenger count sent upstream; anything below one counts as one.
    pub fn adult_count(&self) -> u32 {
        self.adults
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(1)
            .max(1)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TripType {
    #[default]
    OneWay,
    RoundTrip,
}

impl<'de> Deserialize<'de> for TripType {
    /// Anything other than a round trip, including unknown values, is one-way.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        let normalized = raw.trim().to_lowercase().replace(['_', ' '], "-");
        Ok(match normalized.as_str() {
            "round-trip" | "roundtrip" | "return" => TripType::RoundTrip,
            _ => TripType::OneWay,
        })
    }
}

/// A flight offer in the simplified shape the front end renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: String,
    pub airline: String,
    pub flight_number: String,
    pub from: String,
    pub to: String,
    pub departure: String,
    pub arrival: String,
    /// ISO-8601 duration, e.g. PT2H30M
    pub duration: String,
    pub price: String,
    pub currency: String,
    pub seats: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<Value>,
}

/// Request body for POST /api/trains/search.
#[derive(Debug, Clone, Deserialize)]
pub struct TrainSearchRequest {
    /// City name or station code
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    /// YYYY-MM-DD
    #[serde(default)]
    pub date: String,
}

/// A train in the simplified shape the front end renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Train {
    pub id: String,
    pub name: String,
    pub train_number: String,
    pub from: String,
    pub to: String,
    pub departure: String,
    pub arrival: String,
    pub duration: String,
    /// Fare per travel class, in rupees
    pub classes: BTreeMap<String, u32>,
    pub seats: u32,
}

/// Search results envelope shared by flight and train search.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults<T: Serialize> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_mock: bool,
}

impl<T: Serialize> SearchResults<T> {
    pub fn live(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
            message: None,
            is_mock: false,
        }
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            count: 0,
            data: Vec::new(),
            message: Some(message.into()),
            is_mock: false,
        }
    }

    pub fn mock(data: Vec<T>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
            message: Some(message.into()),
            is_mock: true,
        }
    }
}
