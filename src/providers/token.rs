//! Access tokens for the identity provider.
//!
//! A service account key signs a short-lived JWT assertion which the token
//! endpoint trades for an OAuth2 access token. Tokens are cached until shortly
//! before they expire, then minted again.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::CredentialsError;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const IDENTITY_SCOPES: &str =
    "https://www.googleapis.com/auth/cloud-platform https://www.googleapis.com/auth/identitytoolkit";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
// tokens this close to expiry are treated as expired
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, CredentialsError>;

    /// Forget any cached token, e.g. after the provider answered 401.
    async fn invalidate(&self) {}
}

// Fixed token, for emulators or tokens managed elsewhere
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, CredentialsError> {
        Ok(self.0.clone())
    }
}

// The fields we need from a downloaded service account JSON key
#[derive(Deserialize, Clone)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, CredentialsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CredentialsError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS as u64
}

// minted token plus when it stops being usable
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh_at(&self, now: Instant) -> bool {
        now + REFRESH_MARGIN < self.expires_at
    }
}

pub struct ServiceAccountTokenSource {
    client: reqwest::Client,
    client_email: String,
    token_uri: String,
    signing_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    pub fn new(client: reqwest::Client, key: ServiceAccountKey) -> Result<Self, CredentialsError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        Ok(Self {
            client,
            client_email: key.client_email,
            token_uri: key.token_uri,
            signing_key,
            cached: Mutex::new(None),
        })
    }

    pub fn from_file(client: reqwest::Client, path: impl AsRef<Path>) -> Result<Self, CredentialsError> {
        Self::new(client, ServiceAccountKey::from_file(path)?)
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    fn assertion(&self) -> Result<String, CredentialsError> {
        let iat = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: IDENTITY_SCOPES,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        Ok(jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)?)
    }

    async fn mint(&self) -> Result<CachedToken, CredentialsError> {
        let assertion = self.assertion()?;
        let requested_at = Instant::now();

        let res = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(CredentialsError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let token = res.json::<TokenResponse>().await?;
        info!(
            client_email = %self.client_email,
            expires_in = token.expires_in,
            "Minted identity provider access token"
        );

        Ok(CachedToken {
            access_token: token.access_token,
            // measured from the request so clock drift errs on the early side
            expires_at: requested_at + Duration::from_secs(token.expires_in),
        })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<String, CredentialsError> {
        // held across the mint so concurrent callers share one refresh
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|token| token.is_fresh_at(Instant::now())) {
            return Ok(token.access_token.clone());
        }

        debug!(client_email = %self.client_email, "Access token missing or near expiry");
        let token = self.mint().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn invalidate(&self) {
        self.cached.lock().await.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_json_defaults_token_uri() {
        let key = ServiceAccountKey::from_json(
            r#"{"type":"service_account","client_email":"relay@demo.iam.gserviceaccount.com","private_key":"pem"}"#,
        )
        .unwrap();

        assert_eq!(key.client_email, "relay@demo.iam.gserviceaccount.com");
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
        assert!(!format!("{key:?}").contains("pem\""));
    }

    #[test]
    fn key_json_without_private_key_is_rejected() {
        let err = ServiceAccountKey::from_json(r#"{"client_email":"relay@demo"}"#).unwrap_err();
        assert!(matches!(err, CredentialsError::Parse(_)));
    }

    #[test]
    fn garbage_private_key_is_rejected() {
        let key = ServiceAccountKey {
            client_email: "relay@demo".to_string(),
            private_key: "not a pem".to_string(),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
        };
        let err = ServiceAccountTokenSource::new(reqwest::Client::new(), key).err().unwrap();
        assert!(matches!(err, CredentialsError::Key(_)));
    }

    #[test]
    fn token_inside_refresh_margin_is_stale() {
        let now = Instant::now();
        let fresh = CachedToken {
            access_token: "a".to_string(),
            expires_at: now + Duration::from_secs(3600),
        };
        let closing = CachedToken {
            access_token: "b".to_string(),
            expires_at: now + Duration::from_secs(30),
        };

        assert!(fresh.is_fresh_at(now));
        assert!(!closing.is_fresh_at(now));
        assert!(!fresh.is_fresh_at(now + Duration::from_secs(3541)));
    }
}
