//! Booking hand-off: pre-filled WhatsApp and mailto links.
//!
//! Flight and train bookings are not completed server-side. The customer is
//! sent to WhatsApp (and an email draft) with a message the agency confirms
//! by hand.

use serde::{Deserialize, Serialize};

use crate::config::HandoffConfig;
use crate::errors::AppError;
use crate::models::lenient;

/// Request body for POST /api/bookings/handoff.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffRequest {
    /// Service kind shown in the message, e.g. "Flight" or "Train"
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub flight_number: Option<String>,
    #[serde(default)]
    pub train_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_integer")]
    pub passengers: Option<i64>,
    /// Unit price in rupees
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub price: Option<f64>,
}

impl HandoffRequest {
    pub fn passenger_count(&self) -> i64 {
        self.passengers.filter(|p| *p > 0).unwrap_or(1)
    }

    pub fn total_price(&self) -> f64 {
        self.price.unwrap_or(0.0) * self.passenger_count() as f64
    }

    fn is_flight(&self) -> bool {
        self.kind.eq_ignore_ascii_case("flight")
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffLinks {
    pub whatsapp_url: String,
    pub mailto_url: String,
    pub subject: String,
    pub message: String,
    pub total_price: f64,
}

/// Compose the hand-off message and both links.
pub fn build_links(config: &HandoffConfig, request: &HandoffRequest) -> Result<HandoffLinks, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if request.email.trim().is_empty() && request.phone.trim().is_empty() {
        return Err(AppError::Validation("Email or phone is required".to_string()));
    }

    let kind = if request.kind.trim().is_empty() {
        "Travel"
    } else {
        request.kind.trim()
    };
    let total_price = request.total_price();
    let message = compose_message(kind, request, total_price);
    let subject = format!("New {} Booking - {}", kind, request.name.trim());

    Ok(HandoffLinks {
        whatsapp_url: format!(
            "https://wa.me/{}?text={}",
            config.whatsapp_number,
            urlencoding::encode(&message)
        ),
        mailto_url: format!(
            "mailto:{}?subject={}&body={}",
            config.email,
            urlencoding::encode(&subject),
            urlencoding::encode(&message)
        ),
        subject,
        message,
        total_price,
    })
}

fn compose_message(kind: &str, request: &HandoffRequest, total_price: f64) -> String {
    let service_line = if request.is_flight() {
        format!("Flight: {}", request.flight_number.as_deref().unwrap_or_default())
    } else {
        format!("Train: {}", request.train_number.as_deref().unwrap_or_default())
    };

    [
        format!("*New {} Booking Request*", kind),
        String::new(),
        "*Customer Details:*".to_string(),
        format!("Name: {}", request.name.trim()),
        format!("Email: {}", request.email.trim()),
        format!("Phone: {}", request.phone.trim()),
        String::new(),
        "*Journey Details:*".to_string(),
        format!("From: {}", request.from),
        format!("To: {}", request.to),
        format!("Date: {}", request.date),
        service_line,
        format!("Passengers: {}", request.passenger_count()),
        String::new(),
        "*Payment:*".to_string(),
        format!("Total Amount: \u{20b9}{}", total_price),
        String::new(),
        "Please confirm this booking!".to_string(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> HandoffConfig {
        HandoffConfig {
            whatsapp_number: "917037447309".to_string(),
            email: "desk@example.com".to_string(),
        }
    }

    fn request(body: serde_json::Value) -> HandoffRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_total_price_multiplies_passengers() {
        let r = request(json!({"name": "Asha", "phone": "1", "price": "4500", "passengers": 3}));
        assert_eq!(r.total_price(), 13500.0);

        let r = request(json!({"name": "Asha", "phone": "1", "price": 3800}));
        assert_eq!(r.passenger_count(), 1);
        assert_eq!(r.total_price(), 3800.0);

        let r = request(json!({"name": "Asha", "phone": "1", "price": 100, "passengers": 0}));
        assert_eq!(r.passenger_count(), 1);
    }

    #[test]
    fn test_flight_links() {
        let r = request(json!({
            "type": "Flight",
            "name": "Asha Rao",
            "email": "asha@example.com",
            "phone": "+91 98765",
            "from": "DEL",
            "to": "DHM",
            "date": "2026-11-01",
            "flightNumber": "AI-101",
            "passengers": 2,
            "price": 4500
        }));

        let links = build_links(&config(), &r).unwrap();
        assert!(links.message.starts_with("*New Flight Booking Request*"));
        assert!(links.message.contains("Flight: AI-101"));
        assert!(links.message.contains("Total Amount: \u{20b9}9000"));
        assert!(links.message.ends_with("Please confirm this booking!"));
        assert_eq!(links.subject, "New Flight Booking - Asha Rao");

        assert!(links.whatsapp_url.starts_with("https://wa.me/917037447309?text=%2ANew%20Flight"));
        assert!(!links.whatsapp_url.contains(' '));
        assert!(links.whatsapp_url.contains("%0A"));
        assert!(links
            .mailto_url
            .starts_with("mailto:desk@example.com?subject=New%20Flight%20Booking%20-%20Asha%20Rao&body="));
    }

    #[test]
    fn test_train_line_used_for_other_kinds() {
        let r = request(json!({"type": "Train", "name": "Ravi", "email": "r@example.com", "trainNumber": "12301"}));
        let links = build_links(&config(), &r).unwrap();
        assert!(links.message.contains("Train: 12301"));
        assert!(!links.message.contains("Flight:"));
    }

    #[test]
    fn test_requires_name_and_contact() {
        let err = build_links(&config(), &request(json!({"phone": "1"}))).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = build_links(&config(), &request(json!({"name": "Ravi"}))).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
