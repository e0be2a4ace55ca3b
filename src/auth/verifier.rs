//! ID token verification.
//!
//! Firebase ID tokens are RS256 JWTs signed with Google's rotating keys. The
//! key set is fetched on demand and cached; an unknown `kid` forces a refresh
//! at most once a minute.
//! A shared HS256 secret can stand in for Firebase during local development.

use std::time::{Duration, Instant};

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use thiserror::Error;
use tokio::sync::RwLock;

use super::IdTokenClaims;
use crate::config::AuthConfig;

/// How long a fetched key set is trusted.
const JWKS_TTL: Duration = Duration::from_secs(3600);

/// An unknown `kid` only triggers a refetch once the cached set is this old.
const JWKS_MIN_REFRESH: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// No verification mode is configured.
    #[error("token verification is not configured")]
    NotConfigured,
    /// The token failed verification.
    #[error("invalid token: {0}")]
    Invalid(String),
}

enum Mode {
    Firebase { project_id: String, jwks_url: String },
    SharedSecret(String),
    Disabled,
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

/// Verifies bearer tokens according to the configured mode.
pub struct TokenVerifier {
    mode: Mode,
    http: reqwest::Client,
    cache: RwLock<Option<CachedKeys>>,
}

impl TokenVerifier {
    /// Firebase wins when both a project id and a shared secret are configured.
    pub fn new(config: &AuthConfig, http: reqwest::Client) -> Self {
        let mode = match (&config.firebase_project_id, &config.shared_secret) {
            (Some(project_id), _) => Mode::Firebase {
                project_id: project_id.clone(),
                jwks_url: config.jwks_url.clone(),
            },
            (None, Some(secret)) => Mode::SharedSecret(secret.clone()),
            (None, None) => Mode::Disabled,
        };

        Self {
            mode,
            http,
            cache: RwLock::new(None),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self.mode, Mode::Disabled)
    }

    pub fn mode_name(&self) -> &'static str {
        match self.mode {
            Mode::Firebase { .. } => "firebase",
            Mode::SharedSecret(_) => "shared-secret",
            Mode::Disabled => "disabled",
        }
    }

    /// Verify a token and return its claims.
    pub async fn verify(&self, token: &str) -> Result<IdTokenClaims, VerifyError> {
        match &self.mode {
            Mode::Disabled => Err(VerifyError::NotConfigured),
            Mode::SharedSecret(secret) => {
                let mut validation = Validation::new(Algorithm::HS256);
                validation.validate_aud = false;
                decode::<IdTokenClaims>(
                    token,
                    &DecodingKey::from_secret(secret.as_bytes()),
                    &validation,
                )
                .map(|data| data.claims)
                .map_err(|e| VerifyError::Invalid(e.to_string()))
            }
            Mode::Firebase {
                project_id,
                jwks_url,
            } => {
                let header =
                    decode_header(token).map_err(|e| VerifyError::Invalid(e.to_string()))?;
                if header.alg != Algorithm::RS256 {
                    return Err(VerifyError::Invalid(format!(
                        "unexpected algorithm {:?}",
                        header.alg
                    )));
                }
                let kid = header
                    .kid
                    .ok_or_else(|| VerifyError::Invalid("missing key id".to_string()))?;
                let key = self.decoding_key(jwks_url, &kid).await?;

                let mut validation = Validation::new(Algorithm::RS256);
                validation.set_audience(&[project_id.as_str()]);
                validation.set_issuer(&[format!("https://securetoken.google.com/{}", project_id)]);

                let claims = decode::<IdTokenClaims>(token, &key, &validation)
                    .map(|data| data.claims)
                    .map_err(|e| VerifyError::Invalid(e.to_string()))?;

                if claims.sub.is_empty() {
                    return Err(VerifyError::Invalid("empty subject".to_string()));
                }
                Ok(claims)
            }
        }
    }

    async fn decoding_key(&self, jwks_url: &str, kid: &str) -> Result<DecodingKey, VerifyError> {
        {
            let cache = self.cache.read().await;
            if let Some(found) = lookup(cache.as_ref(), kid) {
                return found;
            }
        }

        // Refresh under the write lock so concurrent misses share one fetch.
        let mut cache = self.cache.write().await;
        if let Some(found) = lookup(cache.as_ref(), kid) {
            return found;
        }

        let keys = self.fetch_keys(jwks_url).await?;
        let key = keys
            .find(kid)
            .map(DecodingKey::from_jwk)
            .transpose()
            .map_err(|e| VerifyError::Invalid(e.to_string()))?
            .ok_or_else(|| unknown_kid(kid));

        *cache = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });

        key
    }

    async fn fetch_keys(&self, jwks_url: &str) -> Result<JwkSet, VerifyError> {
        tracing::debug!(url = %jwks_url, "Fetching token signing keys");
        let response = self
            .http
            .get(jwks_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::error!("Failed to fetch signing keys: {}", e);
                VerifyError::Invalid("signing keys unavailable".to_string())
            })?;

        response.json::<JwkSet>().await.map_err(|e| {
            tracing::error!("Malformed signing key set: {}", e);
            VerifyError::Invalid("signing keys unavailable".to_string())
        })
    }
}

fn unknown_kid(kid: &str) -> VerifyError {
    VerifyError::Invalid(format!("unknown key id {}", kid))
}

/// Answer from the cache when it can: the key if present, or a rejection
/// when the set is too recent to refetch. `None` means fetch.
fn lookup(cache: Option<&CachedKeys>, kid: &str) -> Option<Result<DecodingKey, VerifyError>> {
    let cached = cache?;
    let age = cached.fetched_at.elapsed();
    if age >= JWKS_TTL {
        return None;
    }
    match cached.keys.find(kid) {
        Some(jwk) => Some(DecodingKey::from_jwk(jwk).map_err(|e| VerifyError::Invalid(e.to_string()))),
        None if age < JWKS_MIN_REFRESH => Some(Err(unknown_kid(kid))),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn config(project: Option<&str>, secret: Option<&str>) -> AuthConfig {
        AuthConfig {
            firebase_project_id: project.map(str::to_string),
            shared_secret: secret.map(str::to_string),
            jwks_url: "http://127.0.0.1:1/jwks".to_string(),
        }
    }

    fn token(secret: &str, uid: &str, exp_offset: i64) -> String {
        let claims = IdTokenClaims {
            sub: uid.to_string(),
            email: Some("asha@example.com".to_string()),
            name: None,
            picture: None,
            email_verified: true,
            admin: Some(true),
            exp: (chrono::Utc::now().timestamp() + exp_offset) as u64,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_shared_secret_round_trip() {
        let verifier = TokenVerifier::new(&config(None, Some("s3cret")), reqwest::Client::new());
        assert_eq!(verifier.mode_name(), "shared-secret");

        let claims = verifier.verify(&token("s3cret", "uid-1", 3600)).await.unwrap();
        assert_eq!(claims.sub, "uid-1");
        assert_eq!(claims.admin, Some(true));
    }

    #[tokio::test]
    async fn test_shared_secret_rejects_wrong_key_and_expired() {
        let verifier = TokenVerifier::new(&config(None, Some("s3cret")), reqwest::Client::new());

        let wrong = verifier.verify(&token("other", "uid-1", 3600)).await;
        assert!(matches!(wrong, Err(VerifyError::Invalid(_))));

        let expired = verifier.verify(&token("s3cret", "uid-1", -3600)).await;
        assert!(matches!(expired, Err(VerifyError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_disabled_mode() {
        let verifier = TokenVerifier::new(&config(None, None), reqwest::Client::new());
        assert!(!verifier.is_enabled());
        assert_eq!(
            verifier.verify("anything").await,
            Err(VerifyError::NotConfigured)
        );
    }

    #[tokio::test]
    async fn test_firebase_mode_rejects_hs256_tokens() {
        let verifier = TokenVerifier::new(
            &config(Some("dk-holidays"), Some("s3cret")),
            reqwest::Client::new(),
        );
        assert_eq!(verifier.mode_name(), "firebase");

        let result = verifier.verify(&token("s3cret", "uid-1", 3600)).await;
        assert!(matches!(result, Err(VerifyError::Invalid(_))));

        let garbage = verifier.verify("not.a.jwt").await;
        assert!(matches!(garbage, Err(VerifyError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_unknown_key_id_does_not_refetch_fresh_keys() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = axum::Router::new().route(
            "/jwks",
            axum::routing::get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    axum::Json(serde_json::json!({"keys": []}))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut auth = config(Some("dk-holidays"), None);
        auth.jwks_url = format!("http://{}/jwks", addr);
        let verifier = TokenVerifier::new(&auth, reqwest::Client::new());

        // RS256 header naming a key Google never issued
        let forged = "eyJhbGciOiJSUzI1NiIsImtpZCI6ImZvcmdlZC1rZXkiLCJ0eXAiOiJKV1QifQ.e30.c2ln";
        for _ in 0..5 {
            let result = verifier.verify(forged).await;
            assert!(matches!(result, Err(VerifyError::Invalid(_))));
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
