use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Session is required but none was supplied")]
    NilArgumentError,

    #[error("Text is not representable in Shift_JIS: {0:?}")]
    EncodeError(char),

    #[error("Response body is not valid Shift_JIS")]
    DecodeError,

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {0}")]
    StatusNotOk(reqwest::StatusCode),

    #[error("Failed to serialize request: {0}")]
    SerializationError(String),

    #[error("Failed to decode response: {0}")]
    UnmarshalFailed(#[from] serde_json::Error),

    #[error("Wire time error: {0}")]
    TimeError(#[from] crate::core::kernel::temporal::TimeError),

    #[error("Cannot create session: {0}")]
    CanNotCreateSession(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),
}
