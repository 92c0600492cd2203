use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use openssl::hash::MessageDigest;
use openssl::pkey::PKey;
use openssl::sign::Signer;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::constants::{
    JWT_BEARER_GRANT_TYPE, SHEETS_SCOPE, TOKEN_LIFETIME_SECS, TOKEN_REFRESH_MARGIN_SECS,
};
use crate::config::ServiceAccountCredentials;
use crate::error::{IntakeError, Result};

const JWT_HEADER: &[u8] = br#"{"alg":"RS256","typ":"JWT"}"#;

#[derive(Debug, Serialize)]
struct Claims<'a> {
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
    TOKEN_LIFETIME_SECS
}

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Usable for at least the refresh margin from `now`
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now > Duration::seconds(TOKEN_REFRESH_MARGIN_SECS)
    }
}

/// Build a signed RS256 service-account assertion for the Sheets scope
pub fn build_assertion(credentials: &ServiceAccountCredentials, issued_at: i64) -> Result<String> {
    let claims = Claims {
        iss: &credentials.client_email,
        scope: SHEETS_SCOPE,
        aud: &credentials.token_uri,
        iat: issued_at,
        exp: issued_at + TOKEN_LIFETIME_SECS,
    };

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(JWT_HEADER),
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
    );

    let key = PKey::private_key_from_pem(credentials.private_key.as_bytes())
        .map_err(|e| IntakeError::Credentials(format!("unreadable private key: {}", e)))?;
    let mut signer = Signer::new(MessageDigest::sha256(), &key)?;
    signer.update(signing_input.as_bytes())?;
    let signature = signer.sign_to_vec()?;

    Ok(format!(
        "{}.{}",
        signing_input,
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Exchanges service-account assertions for OAuth access tokens and caches them
pub struct ServiceAccountTokenProvider {
    client: reqwest::Client,
    credentials: ServiceAccountCredentials,
    cached: Mutex<Option<AccessToken>>,
}

impl ServiceAccountTokenProvider {
    pub fn new(client: reqwest::Client, credentials: ServiceAccountCredentials) -> Self {
        Self {
            client,
            credentials,
            cached: Mutex::new(None),
        }
    }

    /// Current access token, fetching a new one when the cached token is stale
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.value.clone());
            }
        }

        let token = self.fetch().await?;
        let value = token.value.clone();
        *cached = Some(token);

        Ok(value)
    }

    async fn fetch(&self) -> Result<AccessToken> {
        let now = Utc::now();
        let assertion = build_assertion(&self.credentials, now.timestamp())?;

        tracing::debug!(
            client_email = %self.credentials.client_email,
            token_uri = %self.credentials.token_uri,
            "Requesting access token"
        );

        let response = self
            .client
            .post(&self.credentials.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT_TYPE),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| IntakeError::TokenExchange(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IntakeError::TokenExchange(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| IntakeError::TokenExchange(format!("invalid token response: {}", e)))?;

        tracing::info!(expires_in = token.expires_in, "Obtained access token");

        Ok(AccessToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}
