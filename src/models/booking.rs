//! Booking request model and its status lifecycle.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;

/// Lifecycle status of a booking request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" | "canceled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Whether a booking in this status may move to `next`.
    ///
    /// Re-applying the current status is allowed and changes nothing.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled)
        ) || *self == next
    }
}

/// Payment progress recorded against a booking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

/// Journey or rental details captured by the booking form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub passengers: Option<i64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_price: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A booking request handed to the agency for manual confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Service kind: car, bike, flight, train, tour...
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_phone: Option<String>,
    #[serde(default)]
    pub details: BookingDetails,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request body for POST /api/bookings.
///
/// Status and owner are always set by the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub user_phone: Option<String>,
    #[serde(default)]
    pub details: BookingDetails,
    #[serde(default)]
    pub payment_details: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CreateBookingRequest {
    /// Build the stored booking for `user_id`.
    pub fn into_booking(mut self, user_id: &str, fallback_email: Option<&str>) -> Booking {
        for key in ["status", "userId", "paymentStatus"] {
            self.extra.remove(key);
        }
        Booking {
            kind: self.kind,
            item_id: self.item_id,
            item_name: self.item_name,
            user_id: user_id.to_string(),
            user_name: self.user_name,
            user_email: self.user_email.or_else(|| fallback_email.map(str::to_string)),
            user_phone: self.user_phone,
            details: self.details,
            status: BookingStatus::Pending,
            payment_status: None,
            payment_details: self.payment_details,
            extra: self.extra,
        }
    }
}

/// Request body for PUT /api/bookings/:id/status.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: String,
}
