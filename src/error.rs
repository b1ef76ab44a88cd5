//! Error types for the drive_mirror crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when mirroring items from Google Drive.
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Missing credentials file: no *.json key found in {0:?}")]
    MissingCredentials(PathBuf),

    #[error("Not authenticated: no Google Drive client is available")]
    NotAuthenticated,

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse credentials JSON: {0}")]
    CredentialsParseError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError {
        status: u16,
        message: String,
        reason: Option<String>,
    },

    #[error("Could not extract ID from url \"{0}\"")]
    IdExtraction(String),

    #[error("ID \"{0}\" was not found. Make sure it has been shared with the service account.")]
    NotShared(String),

    #[error("JWT encoding error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Token refresh failed: {0}")]
    TokenRefreshError(String),
}

/// Rate-limit reasons Google reports with a 403 that are worth retrying.
const RATE_LIMIT_REASONS: [&str; 2] = ["rateLimitExceeded", "userRateLimitExceeded"];

impl DriveError {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            DriveError::ApiError { status, .. } => Some(*status),
            DriveError::HttpError(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether a chunk fetch that failed with this error may be attempted again.
    pub fn is_retryable(&self) -> bool {
        match self {
            DriveError::HttpError(err) => {
                err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
            }
            DriveError::ApiError { status, reason, .. } => {
                *status >= 500
                    || *status == 429
                    || (*status == 403
                        && reason
                            .as_deref()
                            .is_some_and(|r| RATE_LIMIT_REASONS.contains(&r)))
            }
            _ => false,
        }
    }
}

/// Result type alias for DriveError.
pub type Result<T> = std::result::Result<T, DriveError>;
