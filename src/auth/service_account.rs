use super::{AccessToken, AuthError, CredentialProvider, SCOPES};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, info};

/// Environment variable holding the service account key JSON.
pub const SERVICE_ACCOUNT_ENV: &str = "GOOGLE_SERVICE_ACCOUNT_JSON";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;

/// The fields of a downloaded service account key we use.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// JWT-bearer flow for a Google service account.
pub struct ServiceAccountCredentials {
    key: ServiceAccountKey,
    http: Client,
}

impl ServiceAccountCredentials {
    pub fn from_json(json: &str, http: Client) -> Result<Self, AuthError> {
        let key: ServiceAccountKey = serde_json::from_str(json)?;
        Ok(Self { key, http })
    }

    /// Read the key JSON from [`SERVICE_ACCOUNT_ENV`].
    pub fn from_env(http: Client) -> Result<Self, AuthError> {
        let json = env::var(SERVICE_ACCOUNT_ENV)
            .map_err(|_| AuthError::MissingSecret(SERVICE_ACCOUNT_ENV.to_string()))?;
        Self::from_json(&json, http)
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    fn claims(&self, now: i64) -> Claims {
        Claims {
            iss: self.key.client_email.clone(),
            scope: SCOPES.join(" "),
            aud: self.key.token_uri.clone(),
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        }
    }

    fn signed_assertion(&self, now: i64) -> Result<String, AuthError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;
        Ok(jsonwebtoken::encode(&header, &self.claims(now), &key)?)
    }
}

impl CredentialProvider for ServiceAccountCredentials {
    #[tracing::instrument(level = "debug", skip(self), fields(account = %self.key.client_email))]
    fn access_token(&self) -> Result<AccessToken, AuthError> {
        let now = Utc::now();
        let assertion = self.signed_assertion(now.timestamp())?;
        debug!(token_uri = %self.key.token_uri, "requesting access token");

        let resp = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        let body: TokenResponse = resp.json()?;
        info!(account = %self.key.client_email, "authenticated service account");

        Ok(AccessToken {
            token: body.access_token,
            expires_at: body.expires_in.map(|secs| now + Duration::seconds(secs)),
        })
    }
}
