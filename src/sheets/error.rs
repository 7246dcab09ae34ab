//! Error types for the spreadsheet gateway

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetsError {
    /// The request never got a response
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("Sheets API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The spreadsheet exists but has no tab with this title
    #[error("spreadsheet {spreadsheet_id} has no tab named {tab:?}")]
    TabNotFound { spreadsheet_id: String, tab: String },

    /// A response body did not have the expected shape
    #[error("unexpected response: {0}")]
    Malformed(String),

    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Auth(#[from] crate::auth::AuthError),
}

pub type Result<T> = std::result::Result<T, SheetsError>;
