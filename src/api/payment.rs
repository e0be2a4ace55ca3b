//! Payment gateway endpoints.
//!
//! Provider keys come from configuration only. The store holds just the
//! selected provider and whether payments are enabled.

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Map};

use super::{done, ApiResponse, ApiResult};
use crate::auth::AuthUser;
use crate::db::{now_timestamp, Repository};
use crate::errors::AppError;
use crate::models::{
    Booking, Collection, CreatePaymentIntentRequest, Document, PaymentIntent, PaymentProvider,
    PaymentSettings, PaymentSettingsView, UpdatePaymentSettingsRequest, VerifiedPayment,
    VerifyPaymentRequest,
};
use crate::providers::ProviderError;
use crate::AppState;

/// Id of the settings document holding the payment configuration.
pub const PAYMENT_SETTINGS_ID: &str = "payment";

/// Read the payment settings, falling back to Stripe/disabled.
pub async fn load_payment_settings(repo: &Repository) -> Result<PaymentSettings, AppError> {
    let doc: Option<Document<PaymentSettings>> =
        repo.get(Collection::Settings, PAYMENT_SETTINGS_ID).await?;
    Ok(doc.map(|d| d.data).unwrap_or_default())
}

/// Store the payment provider selection.
pub async fn save_payment_settings(repo: &Repository, settings: &PaymentSettings) -> Result<(), AppError> {
    let mut patch = Map::new();
    patch.insert("provider".to_string(), json!(settings.provider.as_str()));
    patch.insert("enabled".to_string(), json!(settings.enabled));
    repo.set_merge(Collection::Settings, PAYMENT_SETTINGS_ID, patch).await?;

    tracing::info!(provider = settings.provider.as_str(), enabled = settings.enabled, "Payment settings updated");
    Ok(())
}

/// GET /api/payment/settings - Current provider and key status (admin).
pub async fn get_payment_settings(State(state): State<AppState>) -> ApiResult<PaymentSettingsView> {
    let settings = load_payment_settings(&state.repo).await?;

    let (public_key, secret_key_set) = match settings.provider {
        PaymentProvider::Stripe => (state.stripe.publishable_key(), state.stripe.has_secret()),
        PaymentProvider::Razorpay => (state.razorpay.key_id(), state.razorpay.has_secret()),
    };

    Ok(ApiResponse::new(PaymentSettingsView {
        provider: settings.provider,
        enabled: settings.enabled,
        public_key: public_key.to_string(),
        secret_key_set,
    }))
}

/// PUT /api/payment/settings - Select the provider and toggle payments (admin).
pub async fn update_payment_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdatePaymentSettingsRequest>,
) -> ApiResult<()> {
    let provider = PaymentProvider::from_str(&request.provider).ok_or_else(|| {
        AppError::Validation(format!("Unsupported payment provider: {}", request.provider))
    })?;

    save_payment_settings(
        &state.repo,
        &PaymentSettings {
            provider,
            enabled: request.enabled,
        },
    )
    .await?;
    done("Payment settings updated successfully")
}

/// Payment-intent answer; provider fields sit next to `success`.
#[derive(Debug, Serialize)]
pub struct PaymentIntentResponse {
    pub success: bool,
    #[serde(flatten)]
    pub intent: PaymentIntent,
}

fn payment_failed(e: ProviderError) -> AppError {
    tracing::error!("Payment provider error: {}", e);
    AppError::Payment {
        message: "Payment failed due to configuration".to_string(),
        details: e.description,
    }
}

/// POST /api/payment/create-payment-intent - Start a payment with the active provider.
pub async fn create_payment_intent(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreatePaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, AppError> {
    let settings = load_payment_settings(&state.repo).await?;
    if !settings.enabled {
        return Err(AppError::BadRequest("Payment gateway is not enabled".to_string()));
    }
    if !request.has_valid_amount() {
        return Err(AppError::Validation("Amount must be greater than zero".to_string()));
    }

    let amount = request.minor_units();
    let car_id = request.car_id.as_deref();
    let customer = request.customer_name();
    tracing::info!(uid = %user.uid, provider = settings.provider.as_str(), amount, "Creating payment");

    let intent = match settings.provider {
        PaymentProvider::Stripe => {
            if !state.stripe.has_secret() {
                return Err(AppError::Internal(
                    "Stripe Secret Key not configured in server environment".to_string(),
                ));
            }
            let client_secret = state
                .stripe
                .create_payment_intent(amount, &request.currency, car_id, customer)
                .await
                .map_err(payment_failed)?;
            PaymentIntent::Stripe {
                client_secret,
                public_key: state.stripe.publishable_key().to_string(),
            }
        }
        PaymentProvider::Razorpay => {
            if !state.razorpay.has_secret() || state.razorpay.key_id().is_empty() {
                return Err(AppError::Internal(
                    "Razorpay Keys not configured in server environment".to_string(),
                ));
            }
            let order = state
                .razorpay
                .create_order(amount, &request.currency, car_id, customer)
                .await
                .map_err(payment_failed)?;
            PaymentIntent::Razorpay {
                order_id: order.id,
                amount: order.amount,
                currency: order.currency,
                public_key: state.razorpay.key_id().to_string(),
            }
        }
    };

    Ok(Json(PaymentIntentResponse {
        success: true,
        intent,
    }))
}

/// POST /api/payment/verify - Verify a Razorpay checkout signature.
///
/// A verified payment marks the referenced booking as paid.
pub async fn verify_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<VerifyPaymentRequest>,
) -> ApiResult<VerifiedPayment> {
    if !state.razorpay.has_secret() {
        return Err(AppError::Internal(
            "Razorpay Keys not configured in server environment".to_string(),
        ));
    }

    let valid = state
        .razorpay
        .verify_signature(&request.order_id, &request.payment_id, &request.signature)
        .map_err(payment_failed)?;
    if !valid {
        tracing::warn!(uid = %user.uid, order_id = %request.order_id, "Payment signature mismatch");
        return Err(AppError::BadRequest("Invalid payment signature".to_string()));
    }

    let payment = VerifiedPayment {
        provider: PaymentProvider::Razorpay,
        order_id: request.order_id,
        payment_id: request.payment_id,
        verified_at: now_timestamp(),
    };

    if let Some(booking_id) = request.booking_id.as_deref().filter(|id| !id.is_empty()) {
        let booking: Document<Booking> = state
            .repo
            .get(Collection::Bookings, booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        if !user.can_access(&booking.data.user_id) {
            return Err(AppError::Forbidden("Access denied".to_string()));
        }

        let mut patch = Map::new();
        patch.insert("paymentStatus".to_string(), json!("paid"));
        patch.insert("paymentDetails".to_string(), payment.to_value());
        state
            .repo
            .update::<Booking>(Collection::Bookings, booking_id, patch)
            .await?;
        tracing::info!(booking_id = %booking_id, order_id = %payment.order_id, "Booking marked as paid");
    }

    Ok(ApiResponse::new(payment).with_message("Payment verified successfully"))
}
