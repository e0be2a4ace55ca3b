//! Out-of-band management commands.
//!
//! # Usage
//!
//! ```bash
//! # Grant the admin role to a Firebase uid
//! dk-holidays-api make-admin <uid>
//!
//! # Select the payment provider
//! dk-holidays-api set-payment-provider razorpay
//!
//! # Insert sample cars and tour packages
//! dk-holidays-api seed
//! ```

mod seed;

pub use seed::*;

use crate::api::{load_payment_settings, save_payment_settings};
use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{PaymentProvider, PaymentSettings};

/// Grant the admin role. Works before the user has ever signed in.
pub async fn make_admin(repo: &Repository, uid: &str) -> Result<(), AppError> {
    let uid = uid.trim();
    if uid.is_empty() {
        return Err(AppError::Validation("uid is required".to_string()));
    }
    repo.set_admin(uid, true).await?;
    tracing::info!("Admin role granted to {}", uid);
    Ok(())
}

/// Select the payment provider and enable or disable payments.
pub async fn set_payment_provider(
    repo: &Repository,
    provider: &str,
    enabled: bool,
) -> Result<PaymentSettings, AppError> {
    let provider = PaymentProvider::from_str(provider).ok_or_else(|| {
        AppError::Validation(format!(
            "Unsupported payment provider '{}': expected stripe or razorpay",
            provider
        ))
    })?;

    save_payment_settings(repo, &PaymentSettings { provider, enabled }).await?;
    load_payment_settings(repo).await
}
