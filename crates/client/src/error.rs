use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors surfaced to callers of [`ApiClient`](crate::ApiClient).
#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx response that was not recovered by a token refresh.
    #[error("API error: {} {status_text}: {message}", status.as_u16())]
    Http {
        status: StatusCode,
        status_text: String,
        message: String,
    },
    /// The access token was rejected and could not be refreshed. Local
    /// credentials have been cleared; the user must log in again.
    #[error("session expired, please log in again")]
    SessionExpired,
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("empty response from {endpoint}")]
    EmptyBody { endpoint: String },
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("session storage error: {0}")]
    Storage(#[from] StoreError),
}

impl ClientError {
    /// HTTP status of the failed response, if the error came from one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure of a single refresh episode.
///
/// The same value is handed to every caller waiting on the episode, hence
/// `Clone` and string payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("no refresh token available")]
    MissingRefreshToken,
    #[error("token refresh rejected with status {0}")]
    Rejected(u16),
    #[error("token refresh failed: {0}")]
    Transport(String),
    #[error("invalid token refresh response: {0}")]
    Decode(String),
    /// A login or logout replaced the session while the refresh was in
    /// flight; its outcome was dropped.
    #[error("session changed during token refresh")]
    Superseded,
}

/// Errors reading or writing the durable token file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
