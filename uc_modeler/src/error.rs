//! Error types for uc_modeler

use thiserror::Error;

/// Result type for uc_modeler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for uc_modeler
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Warehouse error: {0}")]
    WarehouseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Statement failed: {message}\n{statement}")]
    ExecutionFailure { statement: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl Error {
    /// Build an `InvalidInput` error from anything printable
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }
}

/// Convert Serde JSON errors to uc_modeler errors
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert Serde YAML errors to uc_modeler errors
impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert TOML deserialization errors to uc_modeler errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}
