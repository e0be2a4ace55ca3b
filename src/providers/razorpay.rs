//! Razorpay orders and checkout signature verification.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::ProviderError;
use crate::config::RazorpayConfig;

type HmacSha256 = Hmac<Sha256>;

/// A created Razorpay order.
#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

pub struct RazorpayClient {
    http: reqwest::Client,
    config: RazorpayConfig,
}

impl RazorpayClient {
    pub fn new(config: RazorpayConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    pub fn has_secret(&self) -> bool {
        self.config.key_secret.is_some()
    }

    pub fn key_id(&self) -> &str {
        self.config.key_id.as_deref().unwrap_or_default()
    }

    /// Create an order for `amount_minor` paise.
    pub async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        car_id: Option<&str>,
        customer_name: Option<&str>,
    ) -> Result<RazorpayOrder, ProviderError> {
        let (Some(key_id), Some(key_secret)) = (&self.config.key_id, &self.config.key_secret) else {
            return Err(error("Razorpay Keys not configured in server environment"));
        };

        let body = json!({
            "amount": amount_minor,
            "currency": currency.to_uppercase(),
            "receipt": format!("receipt_{}", chrono::Utc::now().timestamp_millis()),
            "notes": {
                "carId": car_id,
                "customerName": customer_name,
            },
        });

        tracing::info!(amount = amount_minor, "Creating Razorpay order");

        let response = self
            .http
            .post(format!("{}/v1/orders", self.config.base_url))
            .basic_auth(key_id, Some(key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| error(e.to_string()))?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|e| error(e.to_string()))?;
        if !status.is_success() {
            let description = body
                .pointer("/error/description")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error");
            return Err(error(description));
        }

        let order: RazorpayOrder = serde_json::from_value(body).map_err(|e| error(e.to_string()))?;
        tracing::info!(order_id = %order.id, "Razorpay order created");
        Ok(order)
    }

    /// Check a checkout signature against the configured key secret.
    pub fn verify_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<bool, ProviderError> {
        let secret = self
            .config
            .key_secret
            .as_deref()
            .ok_or_else(|| error("Razorpay Keys not configured in server environment"))?;
        Ok(verify_signature(secret, order_id, payment_id, signature))
    }
}

/// Razorpay signs `"{order_id}|{payment_id}"` with HMAC-SHA256, hex encoded.
pub fn verify_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    expected.as_bytes().ct_eq(signature.trim().to_ascii_lowercase().as_bytes()).into()
}

fn error(description: impl Into<String>) -> ProviderError {
    ProviderError {
        provider: "Razorpay",
        description: description.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_signature_accepts_valid() {
        let signature = sign("s3cret", "order_1", "pay_1");
        assert!(verify_signature("s3cret", "order_1", "pay_1", &signature));
        assert!(verify_signature("s3cret", "order_1", "pay_1", &signature.to_uppercase()));
    }

    #[test]
    fn test_signature_rejects_tampering() {
        let signature = sign("s3cret", "order_1", "pay_1");
        assert!(!verify_signature("other", "order_1", "pay_1", &signature));
        assert!(!verify_signature("s3cret", "order_2", "pay_1", &signature));
        assert!(!verify_signature("s3cret", "order_1", "pay_1", "deadbeef"));
        assert!(!verify_signature("s3cret", "order_1", "pay_1", ""));
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        let client = RazorpayClient::new(
            RazorpayConfig {
                key_id: Some("rzp_test".into()),
                key_secret: None,
                base_url: "http://127.0.0.1:1".into(),
            },
            reqwest::Client::new(),
        );
        assert!(!client.has_secret());
        assert!(client.verify_signature("o", "p", "s").is_err());
    }
}
