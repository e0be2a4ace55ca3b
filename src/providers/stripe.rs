//! Stripe PaymentIntents.

use serde::Deserialize;
use serde_json::Value;

use super::ProviderError;
use crate::config::StripeConfig;

#[derive(Deserialize)]
struct PaymentIntentResponse {
    client_secret: String,
}

pub struct StripeClient {
    http: reqwest::Client,
    config: StripeConfig,
}

impl StripeClient {
    pub fn new(config: StripeConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    pub fn has_secret(&self) -> bool {
        self.config.secret_key.is_some()
    }

    pub fn publishable_key(&self) -> &str {
        self.config.publishable_key.as_deref().unwrap_or_default()
    }

    /// Create a PaymentIntent and return its client secret.
    pub async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        car_id: Option<&str>,
        customer_name: Option<&str>,
    ) -> Result<String, ProviderError> {
        let secret = self.config.secret_key.as_deref().ok_or_else(|| {
            error("Stripe Secret Key not configured in server environment")
        })?;

        let mut form: Vec<(&str, String)> = vec![
            ("amount", amount_minor.to_string()),
            ("currency", currency.to_lowercase()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
        ];
        if let Some(car_id) = car_id {
            form.push(("metadata[carId]", car_id.to_string()));
        }
        if let Some(name) = customer_name {
            form.push(("metadata[customerName]", name.to_string()));
        }

        let response = self
            .http
            .post(format!("{}/v1/payment_intents", self.config.base_url))
            .basic_auth(secret, None::<&str>)
            .form(&form)
            .send()
            .await
            .map_err(|e| error(e.to_string()))?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|e| error(e.to_string()))?;
        if !status.is_success() {
            let description = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error");
            return Err(error(description));
        }

        let intent: PaymentIntentResponse =
            serde_json::from_value(body).map_err(|e| error(e.to_string()))?;
        tracing::info!("Stripe payment intent created");
        Ok(intent.client_secret)
    }
}

fn error(description: impl Into<String>) -> ProviderError {
    ProviderError {
        provider: "Stripe",
        description: description.into(),
    }
}
