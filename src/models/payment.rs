//! Payment gateway settings and payment-intent models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;

/// Supported payment providers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    #[default]
    Stripe,
    Razorpay,
}

impl PaymentProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentProvider::Stripe => "stripe",
            PaymentProvider::Razorpay => "razorpay",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stripe" => Some(PaymentProvider::Stripe),
            "razorpay" => Some(PaymentProvider::Razorpay),
            _ => None,
        }
    }
}

/// The `settings/payment` document. Keys are never stored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentSettings {
    #[serde(default)]
    pub provider: PaymentProvider,
    #[serde(default)]
    pub enabled: bool,
}

/// Settings as shown to the admin dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSettingsView {
    pub provider: PaymentProvider,
    pub enabled: bool,
    pub public_key: String,
    /// Whether the matching secret is present in the server environment
    pub secret_key_set: bool,
}

/// Request body for PUT /api/payment/settings.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePaymentSettingsRequest {
    pub provider: String,
    #[serde(default)]
    pub enabled: bool,
}

/// Customer details attached to an intent for the provider dashboard.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentBookingDetails {
    #[serde(default)]
    pub user_name: Option<String>,
}

/// Request body for POST /api/payment/create-payment-intent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentRequest {
    /// Major units; number or numeric string
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub amount: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub car_id: Option<String>,
    #[serde(default)]
    pub booking_details: Option<IntentBookingDetails>,
}

fn default_currency() -> String {
    "inr".to_string()
}

impl CreatePaymentIntentRequest {
    /// Amount in the currency's minor unit (paise, cents).
    pub fn minor_units(&self) -> i64 {
        (self.amount.unwrap_or_default() * 100.0).round() as i64
    }

    /// Whether the amount is present, finite and above zero.
    pub fn has_valid_amount(&self) -> bool {
        self.amount.is_some_and(|a| a.is_finite() && a > 0.0)
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.booking_details
            .as_ref()
            .and_then(|d| d.user_name.as_deref())
    }
}

/// Provider-specific answer to a payment-intent request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum PaymentIntent {
    #[serde(rename_all = "camelCase")]
    Stripe {
        client_secret: String,
        public_key: String,
    },
    #[serde(rename_all = "camelCase")]
    Razorpay {
        order_id: String,
        amount: i64,
        currency: String,
        public_key: String,
    },
}

/// Request body for POST /api/payment/verify.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
    #[serde(default)]
    pub booking_id: Option<String>,
}

/// Payment details recorded on a booking once a signature checks out.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedPayment {
    pub provider: PaymentProvider,
    pub order_id: String,
    pub payment_id: String,
    pub verified_at: String,
}

impl VerifiedPayment {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minor_units_rounds() {
        let request: CreatePaymentIntentRequest =
            serde_json::from_value(json!({"amount": 1234.567})).unwrap();
        assert_eq!(request.minor_units(), 123457);
        assert_eq!(request.currency, "inr");
    }

    #[test]
    fn test_intent_serializes_with_provider_tag() {
        let intent = PaymentIntent::Razorpay {
            order_id: "order_1".into(),
            amount: 350000,
            currency: "INR".into(),
            public_key: "rzp_test".into(),
        };
        let value = serde_json::to_value(&intent).unwrap();
        assert_eq!(value["provider"], "razorpay");
        assert_eq!(value["orderId"], "order_1");
        assert_eq!(value["amount"], 350000);
    }

    #[test]
    fn test_amount_accepts_numeric_strings() {
        let request: CreatePaymentIntentRequest =
            serde_json::from_value(json!({"amount": "3500.50"})).unwrap();
        assert!(request.has_valid_amount());
        assert_eq!(request.minor_units(), 350050);

        for amount in [json!(0), json!(-5), json!(""), json!(null)] {
            let request: CreatePaymentIntentRequest =
                serde_json::from_value(json!({"amount": amount})).unwrap();
            assert!(!request.has_valid_amount(), "amount {}", amount);
        }

        let missing: CreatePaymentIntentRequest = serde_json::from_value(json!({})).unwrap();
        assert!(!missing.has_valid_amount());
    }

    #[test]
    fn test_settings_default() {
        let settings: PaymentSettings = serde_json::from_value(json!({})).unwrap();
        assert_eq!(settings.provider, PaymentProvider::Stripe);
        assert!(!settings.enabled);
    }
}
