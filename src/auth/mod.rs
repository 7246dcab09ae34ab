//! Credentials for the spreadsheet API
//!
//! A [`CredentialProvider`] turns a secret into a bearer token. The
//! production provider is [`ServiceAccountCredentials`], which signs a JWT
//! with the service account's key and exchanges it at Google's token endpoint.

use chrono::{DateTime, Utc};
use thiserror::Error;

mod service_account;

pub use service_account::{ServiceAccountCredentials, ServiceAccountKey, SERVICE_ACCOUNT_ENV};

/// Read/write access to spreadsheets and the Drive files backing them.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("credential environment variable {0} is not set")]
    MissingSecret(String),

    #[error("service account JSON is invalid: {0}")]
    BadCredentials(#[from] serde_json::Error),

    #[error("cannot sign token request: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("token request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("token endpoint rejected the request (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

/// A bearer token and when it stops working.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait CredentialProvider {
    fn access_token(&self) -> Result<AccessToken, AuthError>;
}

/// A token obtained elsewhere, e.g. from `gcloud auth print-access-token`.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl CredentialProvider for StaticToken {
    fn access_token(&self) -> Result<AccessToken, AuthError> {
        Ok(AccessToken {
            token: self.0.clone(),
            expires_at: None,
        })
    }
}
