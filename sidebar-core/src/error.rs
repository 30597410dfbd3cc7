use thiserror::Error;

/// Failure reported by a [`crate::KeyValueStore`] backend.
///
/// These never reach the engine's callers: [`crate::PersistenceStore`] logs
/// and drops them so in-memory state stays authoritative for the session.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {message}")]
    Unavailable { message: String },
    #[error("storage quota exceeded while writing {key}")]
    QuotaExceeded { key: String },
    #[error("storage rejected {operation} on {key}: {message}")]
    Rejected {
        operation: &'static str,
        key: String,
        message: String,
    },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn rejected(operation: &'static str, key: &str, message: impl Into<String>) -> Self {
        Self::Rejected {
            operation,
            key: key.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse sidebar config as TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to parse sidebar config as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid sidebar config: {field} {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::Invalid { field, reason }
    }
}
