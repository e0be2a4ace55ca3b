//! Configuration module for the DK Holidays backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.
//! Provider secrets live only here; they are never written to the database.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, Error)]
#[error("configuration error: {0}")]
pub struct ConfigError(pub String);

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
    pub auth: AuthConfig,
    pub amadeus: AmadeusConfig,
    pub rapidapi: RapidApiConfig,
    pub stripe: StripeConfig,
    pub razorpay: RazorpayConfig,
    pub smtp: Option<SmtpConfig>,
    pub handoff: HandoffConfig,
}

/// ID token verification settings.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Firebase project id; enables RS256 verification against Google's keys
    pub firebase_project_id: Option<String>,
    /// Shared HS256 secret for local development
    pub shared_secret: Option<String>,
    /// JWKS endpoint for Firebase ID tokens
    pub jwks_url: String,
}

#[derive(Debug, Clone)]
pub struct AmadeusConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct RapidApiConfig {
    pub key: Option<String>,
    pub host: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: Option<String>,
    pub publishable_key: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    pub key_id: Option<String>,
    pub key_secret: Option<String>,
    pub base_url: String,
}

/// SMTP settings for booking notifications. Present only when a host is set.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub notify_address: String,
}

/// Destinations for WhatsApp and email booking hand-off links.
#[derive(Debug, Clone)]
pub struct HandoffConfig {
    pub whatsapp_number: String,
    pub email: String,
}

pub const DEFAULT_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
const DEFAULT_RAPIDAPI_HOST: &str = "indian-railway-irctc.p.rapidapi.com";

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "./data/dk-holidays.sqlite".into(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            log_level: "info".to_string(),
            cors_origins: Vec::new(),
            auth: AuthConfig {
                firebase_project_id: None,
                shared_secret: None,
                jwks_url: DEFAULT_JWKS_URL.to_string(),
            },
            amadeus: AmadeusConfig {
                client_id: None,
                client_secret: None,
                base_url: "https://test.api.amadeus.com".to_string(),
            },
            rapidapi: RapidApiConfig {
                key: None,
                host: DEFAULT_RAPIDAPI_HOST.to_string(),
                base_url: format!("https://{}", DEFAULT_RAPIDAPI_HOST),
            },
            stripe: StripeConfig {
                secret_key: None,
                publishable_key: None,
                base_url: "https://api.stripe.com".to_string(),
            },
            razorpay: RazorpayConfig {
                key_id: None,
                key_secret: None,
                base_url: "https://api.razorpay.com".to_string(),
            },
            smtp: None,
            handoff: HandoffConfig {
                whatsapp_number: "917037447309".to_string(),
                email: "lokesh25@navgurukul.org".to_string(),
            },
        }
    }
}

/// Read a variable, treating empty strings as unset.
fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let db_path = var("DK_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let bind_addr = match var("DK_BIND_ADDR") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError(format!("invalid DK_BIND_ADDR: {}", raw)))?,
            None => defaults.bind_addr,
        };

        let log_level = var("DK_LOG_LEVEL").unwrap_or(defaults.log_level);

        let cors_origins = var("DK_CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let auth = AuthConfig {
            firebase_project_id: var("FIREBASE_PROJECT_ID"),
            shared_secret: var("DK_AUTH_SECRET"),
            jwks_url: var("FIREBASE_JWKS_URL").unwrap_or(defaults.auth.jwks_url),
        };

        let amadeus = AmadeusConfig {
            client_id: var("AMADEUS_CLIENT_ID"),
            client_secret: var("AMADEUS_CLIENT_SECRET"),
            base_url: var("AMADEUS_BASE_URL").unwrap_or(defaults.amadeus.base_url),
        };

        let rapid_host = var("RAPIDAPI_HOST").unwrap_or(defaults.rapidapi.host);
        let rapidapi = RapidApiConfig {
            key: var("RAPIDAPI_KEY"),
            base_url: var("RAPIDAPI_BASE_URL").unwrap_or_else(|| format!("https://{}", rapid_host)),
            host: rapid_host,
        };

        let stripe = StripeConfig {
            secret_key: var("STRIPE_SECRET_KEY"),
            publishable_key: var("STRIPE_PUBLISHABLE_KEY"),
            base_url: var("STRIPE_BASE_URL").unwrap_or(defaults.stripe.base_url),
        };

        let razorpay = RazorpayConfig {
            key_id: var("RAZORPAY_KEY_ID"),
            key_secret: var("RAZORPAY_KEY_SECRET"),
            base_url: var("RAZORPAY_BASE_URL").unwrap_or(defaults.razorpay.base_url),
        };

        let smtp = match var("SMTP_HOST") {
            Some(host) => {
                let port = match var("SMTP_PORT") {
                    Some(raw) => raw
                        .parse()
                        .map_err(|_| ConfigError(format!("invalid SMTP_PORT: {}", raw)))?,
                    None => 587,
                };
                let username = var("SMTP_USERNAME").unwrap_or_default();
                Some(SmtpConfig {
                    host,
                    port,
                    from_address: var("SMTP_FROM").unwrap_or_else(|| username.clone()),
                    username,
                    password: var("SMTP_PASSWORD").unwrap_or_default(),
                    notify_address: var("BOOKING_NOTIFY_EMAIL")
                        .unwrap_or_else(|| defaults.handoff.email.clone()),
                })
            }
            None => None,
        };

        let handoff = HandoffConfig {
            whatsapp_number: var("DK_WHATSAPP_NUMBER").unwrap_or(defaults.handoff.whatsapp_number),
            email: var("DK_HANDOFF_EMAIL").unwrap_or(defaults.handoff.email),
        };

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            cors_origins,
            auth,
            amadeus,
            rapidapi,
            stripe,
            razorpay,
            smtp,
            handoff,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: &[&str] = &[
        "DK_DB_PATH",
        "DK_BIND_ADDR",
        "DK_LOG_LEVEL",
        "DK_CORS_ORIGINS",
        "FIREBASE_PROJECT_ID",
        "DK_AUTH_SECRET",
        "RAPIDAPI_HOST",
        "RAPIDAPI_BASE_URL",
        "SMTP_HOST",
    ];

    // Both cases share one test so they never race on process env.
    #[test]
    fn test_config_from_env() {
        for name in VARS {
            env::remove_var(name);
        }

        let config = Config::from_env().unwrap();

        assert!(config.auth.firebase_project_id.is_none());
        assert!(config.auth.shared_secret.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/dk-holidays.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:5000");
        assert_eq!(config.log_level, "info");
        assert!(config.cors_origins.is_empty());
        assert!(config.smtp.is_none());
        assert_eq!(
            config.rapidapi.base_url,
            "https://indian-railway-irctc.p.rapidapi.com"
        );

        env::set_var("DK_CORS_ORIGINS", "https://dk-holidays.web.app, http://localhost:5173,");
        env::set_var("RAPIDAPI_HOST", "rail.example.com");
        let config = Config::from_env().unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["https://dk-holidays.web.app", "http://localhost:5173"]
        );
        assert_eq!(config.rapidapi.base_url, "https://rail.example.com");

        env::set_var("DK_BIND_ADDR", "not-an-address");
        let err = Config::from_env().unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration error: invalid DK_BIND_ADDR: not-an-address"
        );

        for name in VARS {
            env::remove_var(name);
        }
    }
}
