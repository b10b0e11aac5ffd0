use crate::services::secure_channel::ChannelFailure;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid position sample: {0}")]
    InvalidSample(String),

    #[error("Invalid maze definition: {0}")]
    InvalidMaze(String),

    #[error("Secure channel failure: {0}")]
    Channel(#[from] ChannelFailure),

    #[error("Backend answered with HTTP {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("Failed to decode backend payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Location settings cannot be satisfied: {0}")]
    SettingsUnsatisfiable(String),

    #[error("Session cannot do that now: {0}")]
    SessionState(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
