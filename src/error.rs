use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("driver not found: {0}")]
    DriverNotFound(String),
    #[error("driver {0} is abstract and cannot be instantiated")]
    AbstractDriver(String),
    #[error("invalid settings schema for key '{key}': {reason}")]
    InvalidSettingsSchema { key: String, reason: String },
    #[error("Card details were not submitted over a secure connection.")]
    InsecureCardSubmission,
    #[error("no payment driver is loaded")]
    NoDriverLoaded,
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
