//! Clients for third-party travel search and payment APIs.
//!
//! All clients share one `reqwest::Client` and take their base URLs from
//! configuration.

mod amadeus;
mod rail;
mod razorpay;
mod stripe;

pub use amadeus::*;
pub use rail::*;
pub use razorpay::*;
pub use stripe::*;

use std::time::Duration;

/// Timeout applied to every outbound request.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(15);

/// Build the shared HTTP client.
pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(UPSTREAM_TIMEOUT)
        .user_agent(concat!("dk-holidays-api/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Failure reported by a payment provider.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{provider} error: {description}")]
pub struct ProviderError {
    pub provider: &'static str,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_message() {
        let err = ProviderError {
            provider: "Razorpay",
            description: "Authentication failed".to_string(),
        };
        assert_eq!(err.to_string(), "Razorpay error: Authentication failed");
    }
}
