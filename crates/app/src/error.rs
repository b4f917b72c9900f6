use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Client(#[from] client::ClientError),
    #[error("invalid filter: {0}")]
    Filter(#[from] engine::FilterError),
    #[error("invalid input: {0}")]
    Validation(#[from] engine::ValidationError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Input(String),
}

impl AppError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::Client(client::ClientError::SessionExpired))
    }
}
