//! Error types for setup and analysis operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MiniScatterError {
    /// Malformed numeric field or missing separator in a configuration string
    #[error("Could not parse {field} from '{raw}': {reason}")]
    Parse {
        field: String,
        raw: String,
        reason: String,
    },

    /// Well-formed inputs that do not make sense together
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Covariance matrix not positive definite within tolerance
    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MiniScatterError {
    pub fn parse(field: impl Into<String>, raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            field: field.into(),
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn numerical(message: impl Into<String>) -> Self {
        Self::Numerical(message.into())
    }
}
