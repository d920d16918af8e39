use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("API quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("All data sources failed for {0}")]
    AllSourcesFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Telegram error: {0}")]
    TelegramError(String),
}
