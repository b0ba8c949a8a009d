use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::ServiceAccountKey;
use crate::error::FetchError;
use crate::services::upstream;

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

const SERVICE: &str = "google oauth";
const ASSERTION_TTL_SECS: i64 = 3600;
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_TTL_SECS
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Service-account OAuth2 (JWT bearer grant) with a per-scope token cache.
pub struct GoogleAuth {
    client: Client,
    key: ServiceAccountKey,
    cache: Mutex<HashMap<String, CachedToken>>,
}

impl GoogleAuth {
    pub fn new(client: Client, key: ServiceAccountKey) -> Self {
        Self {
            client,
            key,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Bearer token for `scope`, reused until a minute before it expires.
    pub async fn access_token(&self, scope: &str) -> Result<String, FetchError> {
        let mut cache = self.cache.lock().await;
        let now = Utc::now();
        if let Some(cached) = cache.get(scope) {
            if cached.expires_at - Duration::seconds(60) > now {
                return Ok(cached.token.clone());
            }
        }

        let assertion = self.assertion(scope, now)?;
        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let token: TokenResponse = upstream::read_json(SERVICE, response)
            .await
            .map_err(|e| FetchError::Auth(e.to_string()))?;

        let expires_at = Duration::try_seconds(token.expires_in)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| FetchError::Auth(format!("invalid expires_in: {}", token.expires_in)))?;

        tracing::debug!("Obtained Google access token for {}", scope);
        cache.insert(
            scope.to_string(),
            CachedToken {
                token: token.access_token.clone(),
                expires_at,
            },
        );
        Ok(token.access_token)
    }

    fn assertion(&self, scope: &str, now: DateTime<Utc>) -> Result<String, FetchError> {
        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_TTL_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| FetchError::Auth(format!("invalid private key: {e}")))?;
        encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| FetchError::Auth(e.to_string()))
    }
}
