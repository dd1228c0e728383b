//! Error types for the fairness engine
//!
//! Malformed bet arrays are not errors: the validator reports them as a
//! `Malformed` classification. Everything here is a condition the caller
//! cannot turn into a meaningful result.

/// Root error type for all fairness operations
#[derive(Debug, thiserror::Error)]
pub enum FairnessError {
    /// An input outside the operation's domain (zero outcome count, bad hex, ...)
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Client seed is {length} characters long (max {max})")]
    ClientSeedTooLong { length: usize, max: usize },

    #[error("A play is already in flight; client seed is locked")]
    PlayInFlight,

    #[error("No play is in flight")]
    NoPlayInFlight,

    #[error("Nonce exhausted")]
    NonceExhausted,

    /// The underlying hash primitive failed. Fatal; never retried.
    #[error("Hash primitive failure: {0}")]
    HashPrimitive(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl FairnessError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        FairnessError::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// True for conditions caused by caller input rather than the runtime.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            FairnessError::InvalidArgument { .. } | FairnessError::ClientSeedTooLong { .. }
        )
    }
}

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl From<toml::de::Error> for ConfigurationError {
    fn from(e: toml::de::Error) -> Self {
        ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e))
    }
}

impl From<toml::ser::Error> for ConfigurationError {
    fn from(e: toml::ser::Error) -> Self {
        ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e))
    }
}

// Convenience type alias for Results
pub type FairnessResult<T> = Result<T, FairnessError>;
